//! Server-provided endpoint defaults

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Path the GPU telemetry service exposes its samples on.
pub const GPU_DATA_PATH: &str = "/api/gpu-data";

/// Body of `GET /api/config`.
///
/// Older servers only send the Ollama pair, so the GPU fields are optional.
/// Ports arrive as strings or numbers depending on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDefaults {
    pub ollama_host: String,
    #[serde(deserialize_with = "port_text")]
    pub ollama_port: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_api_host: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_port_text"
    )]
    pub gpu_api_port: Option<String>,
}

impl ServerDefaults {
    /// Model-runtime base URL, `http://{host}:{port}`.
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama_host, self.ollama_port)
    }

    /// GPU telemetry URL, present only when both host and port were sent.
    pub fn gpu_url(&self) -> Option<String> {
        match (&self.gpu_api_host, &self.gpu_api_port) {
            (Some(host), Some(port)) => {
                Some(format!("http://{}:{}{}", host, port, GPU_DATA_PATH))
            }
            _ => None,
        }
    }
}

fn port_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a port string or number, got {}",
            other
        ))),
    }
}

fn optional_port_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
