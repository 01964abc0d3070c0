//! Static file handler

use super::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Serve `uri` from the configured root; `/` maps to `index.html`.
pub(super) async fn static_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let Some(relative) = resolve(uri.path()) else {
        tracing::debug!(path = uri.path(), "Rejected path outside root");
        return not_found();
    };

    let full = state.root.join(&relative);
    match tokio::fs::read(&full).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&relative).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content).into_response()
        }
        Err(e) if e.kind() == ErrorKind::NotFound => not_found(),
        Err(e) => {
            tracing::warn!(path = %full.display(), error = %e, "Failed to read file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server error: {}", e.kind()),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

/// Map a request path to a path relative to the root.
///
/// `None` for anything that could escape the root.
fn resolve(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let relative = if trimmed.is_empty() {
        Path::new("index.html")
    } else {
        Path::new(trimmed)
    };

    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| relative.to_path_buf())
}
