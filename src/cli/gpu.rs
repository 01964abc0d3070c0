//! GPU command implementation

use crate::cli::context::open_session;
use crate::cli::output::{format_gpu_json, format_view};
use crate::cli::SnapshotArgs;
use crate::monitor::MonitorSession;

/// Handle `llmswitch gpu`
pub async fn handle_gpu(args: &SnapshotArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;
    session.refresh_gpu().await;
    let output = render_gpu_output(&session, args.json);
    session.shutdown().await;
    output
}

/// Format the GPU view of an already refreshed session.
pub fn render_gpu_output(
    session: &MonitorSession,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let gpu = session.gpu();
    if !json {
        return Ok(format_view("GPU Monitoring", &gpu.view()));
    }
    match gpu.last_report() {
        Some(report) => Ok(format_gpu_json(&report, &gpu.url())?),
        None => Err(match gpu.last_error() {
            Some(e) => e.into(),
            None => "No GPU data available".into(),
        }),
    }
}
