//! File server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Static file server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for every path other than `/api/config`
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
            root: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    /// Origin a browser would see for this server, e.g. `http://localhost:8000`.
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
