//! Models command implementation

use crate::cli::context::open_session;
use crate::cli::output::{format_models_json, format_view};
use crate::cli::SnapshotArgs;
use crate::monitor::MonitorSession;

/// Handle `llmswitch models`
pub async fn handle_models(args: &SnapshotArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;
    session.refresh_models().await;
    let output = render_models_output(&session, args.json);
    session.shutdown().await;
    output
}

/// Format the model view of an already refreshed session.
pub fn render_models_output(
    session: &MonitorSession,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let models = session.models();
    if !json {
        return Ok(format_view("Models", &models.view()));
    }
    match models.last_report() {
        Some(report) => Ok(format_models_json(&report, &models.base_url())?),
        None => Err(match models.last_error() {
            Some(e) => e.into(),
            None => "No model data available".into(),
        }),
    }
}
