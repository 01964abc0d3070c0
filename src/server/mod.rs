//! Dashboard file server.
//!
//! Serves the static dashboard from a directory and hands the browser its
//! endpoint defaults on `GET /api/config`.
//!
//! # Example
//!
//! ```rust,no_run
//! use llmswitch::config::{ServerDefaults, UpstreamConfig};
//! use llmswitch::server::{create_router, AppState};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let defaults = ServerDefaults::from(&UpstreamConfig::default());
//! let state = Arc::new(AppState::new(defaults, "public"));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod files;

use crate::config::ServerDefaults;
use axum::{
    extract::State,
    http::{header, Method},
    routing::get,
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub defaults: ServerDefaults,
    /// Directory static files are served from
    pub root: PathBuf,
}

impl AppState {
    pub fn new(defaults: ServerDefaults, root: impl Into<PathBuf>) -> Self {
        Self {
            defaults,
            root: root.into(),
        }
    }
}

/// Build the router: `/api/config` plus static files for every other path.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/config", get(config_handler))
        .fallback(files::static_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/config`
async fn config_handler(State(state): State<Arc<AppState>>) -> Json<ServerDefaults> {
    metrics::counter!("llmswitch_config_requests_total").increment(1);
    Json(state.defaults.clone())
}
