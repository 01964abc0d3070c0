//! Endpoint and interval command implementations

use crate::cli::context::open_session;
use crate::cli::output::{format_endpoints_json, format_endpoints_table, EndpointView};
use crate::cli::{EndpointArgs, IntervalArgs};
use crate::monitor::MonitorSession;

/// Endpoint rows for both views of `session`.
pub fn endpoint_views(session: &MonitorSession) -> Vec<EndpointView> {
    let models = session.models();
    let gpu = session.gpu();
    let models_endpoint = models.endpoint();
    let gpu_endpoint = gpu.endpoint();

    vec![
        EndpointView {
            view: "Models".to_string(),
            configured: models_endpoint.base_url,
            resolved: models.base_url(),
            source: models_endpoint.source,
            status: EndpointView::status_label(&models.view()),
        },
        EndpointView {
            view: "GPU".to_string(),
            configured: gpu_endpoint.base_url,
            resolved: gpu.url(),
            source: gpu_endpoint.source,
            status: EndpointView::status_label(&gpu.view()),
        },
    ]
}

/// Handle `llmswitch endpoint`
///
/// Without `--models`/`--gpu` this only reports the active endpoints. Saved
/// endpoints are fetched once so the status column reflects them.
pub async fn handle_endpoint(args: &EndpointArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;

    if args.models.is_some() || args.gpu.is_some() {
        let saved = session
            .save_endpoints(args.models.as_deref(), args.gpu.as_deref())
            .await;
        if !saved {
            session.shutdown().await;
            return Err("No endpoint saved: enter a non-empty URL".into());
        }
    }

    let endpoints = endpoint_views(&session);
    session.shutdown().await;

    if args.json {
        Ok(format_endpoints_json(&endpoints)?)
    } else {
        Ok(format_endpoints_table(&endpoints))
    }
}

/// Handle `llmswitch interval`
pub async fn handle_interval(args: &IntervalArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;

    let result = match args.seconds {
        Some(seconds) => session
            .save_refresh_interval(seconds)
            .map(|s| format!("✓ Auto-refresh interval set to {} seconds", s)),
        None => Ok(format!(
            "Auto-refresh every {} seconds",
            session.policy().interval_seconds()
        )),
    };

    session.shutdown().await;
    Ok(result?)
}
