//! Debug log command implementations

use crate::cli::context::open_debug_sink;
use crate::cli::output::{format_debug_entries, format_debug_json};
use crate::cli::{DebugClearArgs, DebugExportArgs, DebugShowArgs};
use crate::debug::{export_file_name, LevelFilter};
use chrono::Utc;
use std::path::PathBuf;

/// Handle `llmswitch debug show`
pub fn handle_debug_show(args: &DebugShowArgs) -> Result<String, Box<dyn std::error::Error>> {
    let filter: LevelFilter = args.level.parse()?;
    let sink = open_debug_sink(&args.monitor)?;

    let mut entries = sink.filtered(filter);
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.json {
        Ok(format_debug_json(&entries)?)
    } else {
        Ok(format_debug_entries(&entries))
    }
}

/// Handle `llmswitch debug clear`
pub fn handle_debug_clear(args: &DebugClearArgs) -> Result<String, Box<dyn std::error::Error>> {
    let sink = open_debug_sink(&args.monitor)?;
    let count = sink.len();
    sink.clear();
    Ok(format!("✓ Debug log cleared ({} entries removed)", count))
}

/// Handle `llmswitch debug export`
///
/// Returns the path of the written file.
pub fn export_debug_log(args: &DebugExportArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let sink = open_debug_sink(&args.monitor)?;
    let path = args.output_dir.join(export_file_name(Utc::now()));

    std::fs::create_dir_all(&args.output_dir)?;
    std::fs::write(&path, sink.export())?;
    sink.info("Debug log exported");

    Ok(path)
}

pub fn handle_debug_export(args: &DebugExportArgs) -> Result<String, Box<dyn std::error::Error>> {
    let path = export_debug_log(args)?;
    Ok(format!("✓ Debug log exported to {}", path.display()))
}
