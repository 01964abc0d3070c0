//! Serve command implementation

use crate::cli::ServeArgs;
use crate::config::{LlmSwitchConfig, ServerDefaults};
use crate::logging::init_tracing;
use crate::server::{create_router, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<LlmSwitchConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = LlmSwitchConfig::load_or_default(&args.config)?;

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref root) = args.root {
        config.server.root = root.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;

    // Validate configuration
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting LLMSwitch dashboard server");
    tracing::debug!(?config, "Loaded configuration");

    if !config.server.root.join("index.html").exists() {
        tracing::warn!(
            root = %config.server.root.display(),
            "No index.html in the document root; / will answer 404"
        );
    }

    // 3. Build router
    let defaults = ServerDefaults::from(&config.upstream);
    tracing::info!(
        ollama = %defaults.ollama_url(),
        gpu = ?defaults.gpu_url(),
        "Advertising endpoint defaults"
    );
    let state = Arc::new(AppState::new(defaults, config.server.root.clone()));
    let app = create_router(state);

    // 4. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "LLMSwitch dashboard listening");

    let cancel_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    tracing::info!("LLMSwitch server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn serve_args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            root: None,
            log_level: None,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nroot = \"public\"").unwrap();

        let config = load_config_with_overrides(&serve_args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.root, PathBuf::from("public"));
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080\nroot = \"public\"").unwrap();

        let mut args = serve_args(temp.path().to_path_buf());
        args.port = Some(9000);
        args.root = Some(PathBuf::from("/srv/llmswitch"));

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.server.port, 9000); // CLI wins
        assert_eq!(config.server.root, PathBuf::from("/srv/llmswitch"));
    }

    #[test]
    fn test_serve_works_without_config_file() {
        let config =
            load_config_with_overrides(&serve_args(PathBuf::from("nonexistent.toml"))).unwrap();
        assert_eq!(config.server.host, "localhost");
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_when_cancelled() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_clone.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), shutdown_signal(cancel)).await;
        assert!(result.is_ok(), "Shutdown didn't trigger");

        handle.await.unwrap();
    }
}
