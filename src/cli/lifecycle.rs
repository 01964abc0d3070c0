//! Load and unload command implementations

use crate::cli::context::open_session;
use crate::cli::ModelActionArgs;
use crate::fetch::UnloadMethod;

/// Handle `llmswitch load`
pub async fn handle_load(args: &ModelActionArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;
    let result = session.load_model(&args.model).await;
    let running = session
        .models()
        .last_report()
        .map(|report| report.running_count());
    session.shutdown().await;

    result?;
    Ok(match running {
        Some(count) => format!("✓ Model {} loaded ({} running)", args.model, count),
        None => format!("✓ Model {} loaded", args.model),
    })
}

/// Handle `llmswitch unload`
pub async fn handle_unload(args: &ModelActionArgs) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_session(&args.monitor).await?;
    let result = session.stop_model(&args.model).await;
    session.shutdown().await;

    Ok(match result? {
        UnloadMethod::KeepAlive => format!("✓ Model {} unloaded", args.model),
        UnloadMethod::Fallback => format!(
            "✓ Model {} unloaded (alternative request; it may take a moment to free memory)",
            args.model
        ),
    })
}
