//! Upstream API locations advertised by the file server

use super::defaults::ServerDefaults;
use serde::{Deserialize, Serialize};

/// Hosts and ports of the monitored APIs, as seen from the browser.
///
/// Served verbatim on `GET /api/config`. Ports stay strings because they are
/// taken from the environment untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub ollama_host: String,
    pub ollama_port: String,
    pub gpu_api_host: String,
    pub gpu_api_port: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            ollama_host: "localhost".to_string(),
            ollama_port: "11434".to_string(),
            gpu_api_host: "localhost".to_string(),
            gpu_api_port: "5000".to_string(),
        }
    }
}

impl From<&UpstreamConfig> for ServerDefaults {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            ollama_host: config.ollama_host.clone(),
            ollama_port: config.ollama_port.clone(),
            gpu_api_host: Some(config.gpu_api_host.clone()),
            gpu_api_port: Some(config.gpu_api_port.clone()),
        }
    }
}
