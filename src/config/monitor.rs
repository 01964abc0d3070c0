//! Monitor (polling client) configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard-coded model-runtime endpoint used when nothing else is known.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Placeholder GPU endpoint. A GPU view still pointing here is treated as
/// not configured.
pub const GPU_PLACEHOLDER_URL: &str = "http://your-server-ip:5000/api/gpu-data";

/// Settings for the polling monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Origin of the dashboard server. Relative endpoints resolve against it
    /// and `/api/config` is fetched from it.
    pub origin: String,
    /// Fallback model-runtime URL
    pub ollama_url: String,
    /// Fallback GPU telemetry URL
    pub gpu_url: String,
    /// Refresh interval used when none is stored
    pub refresh_interval_seconds: u32,
    /// Per-request timeout
    pub request_timeout_seconds: u64,
    /// Query `/api/config` once at startup for endpoint defaults
    pub fetch_server_defaults: bool,
    /// Re-fetch, not only re-render, when the viewport is resized
    pub refetch_on_resize: bool,
    /// Location of the persisted key-value state
    pub state_file: PathBuf,
    /// Debug entries kept in memory
    pub debug_retention: usize,
    /// Debug entries persisted across restarts
    pub debug_persisted: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            gpu_url: GPU_PLACEHOLDER_URL.to_string(),
            refresh_interval_seconds: 30,
            request_timeout_seconds: 10,
            fetch_server_defaults: true,
            refetch_on_resize: true,
            state_file: PathBuf::from("llmswitch-state.json"),
            debug_retention: 1000,
            debug_persisted: 100,
        }
    }
}
