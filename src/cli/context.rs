//! Session bootstrap shared by the monitor commands

use crate::cli::MonitorArgs;
use crate::config::LlmSwitchConfig;
use crate::debug::DebugSink;
use crate::fetch::JsonFetcher;
use crate::monitor::MonitorSession;
use crate::store::{FileStore, KeyValueStore};
use std::sync::Arc;
use std::time::Duration;

/// Approximate pixel width of one terminal column.
pub const CHAR_WIDTH_PX: u32 = 10;

/// Columns assumed when `COLUMNS` is unset or unusable.
pub const DEFAULT_COLUMNS: u32 = 80;

/// Load configuration for a monitor command
///
/// File (when present), then environment, then flags.
pub fn load_monitor_config(
    args: &MonitorArgs,
) -> Result<LlmSwitchConfig, Box<dyn std::error::Error>> {
    let mut config = LlmSwitchConfig::load_or_default(&args.config)?.with_env_overrides();

    if let Some(ref path) = args.state_file {
        config.monitor.state_file = path.clone();
    }
    if let Some(ref origin) = args.origin {
        config.monitor.origin = origin.clone();
    }
    if args.no_server_defaults {
        config.monitor.fetch_server_defaults = false;
    }

    config.validate()?;
    Ok(config)
}

/// Pixel width for a terminal `columns` wide, as reported by `COLUMNS`.
pub fn width_for_columns(columns: Option<&str>) -> u32 {
    columns
        .and_then(|c| c.trim().parse::<u32>().ok())
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_COLUMNS)
        .saturating_mul(CHAR_WIDTH_PX)
}

/// Viewport width: the `--width` flag, else derived from the terminal.
pub fn viewport_width(args: &MonitorArgs) -> u32 {
    args.width.unwrap_or_else(|| {
        let columns = std::env::var("COLUMNS").ok();
        width_for_columns(columns.as_deref())
    })
}

/// Open the persisted state and a session on top of it, without fetching.
pub async fn open_session(
    args: &MonitorArgs,
) -> Result<MonitorSession, Box<dyn std::error::Error>> {
    let config = load_monitor_config(args)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.monitor.state_file)?);
    let fetcher = JsonFetcher::new(Duration::from_secs(
        config.monitor.request_timeout_seconds,
    ))?;

    tracing::debug!(
        state_file = %config.monitor.state_file.display(),
        origin = %config.monitor.origin,
        "Opening monitor session"
    );

    Ok(MonitorSession::open(config.monitor, store, fetcher, viewport_width(args)).await)
}

/// Open only the persisted debug log, without touching the network.
pub fn open_debug_sink(args: &MonitorArgs) -> Result<DebugSink, Box<dyn std::error::Error>> {
    let config = load_monitor_config(args)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.monitor.state_file)?);
    Ok(DebugSink::open(
        store,
        config.monitor.debug_retention,
        config.monitor.debug_persisted,
    ))
}
