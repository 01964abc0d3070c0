//! GPU telemetry data source.

use super::{FetchError, JsonFetcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One GPU as reported by the telemetry service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSample {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub index: u32,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "temperature", default, deserialize_with = "lenient_f64")]
    pub temperature_c: f64,
    #[serde(rename = "gpu_utilization", default, deserialize_with = "lenient_f64")]
    pub gpu_util_pct: f64,
    #[serde(rename = "memory_utilization", default, deserialize_with = "lenient_f64")]
    pub mem_util_pct: f64,
    #[serde(rename = "memory_used", default, deserialize_with = "lenient_f64")]
    pub mem_used_mb: f64,
    #[serde(rename = "memory_total", default, deserialize_with = "lenient_f64")]
    pub mem_total_mb: f64,
    #[serde(rename = "power_draw", default, deserialize_with = "lenient_f64")]
    pub power_draw_w: f64,
}

/// Memory held by a GPU process. Services report either a number or a
/// preformatted string such as `"1024 MiB"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessMemory {
    Amount(f64),
    Text(String),
}

impl fmt::Display for ProcessMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessMemory::Amount(n) => write!(f, "{}", crate::render::format_number(*n)),
            ProcessMemory::Text(s) => f.write_str(s),
        }
    }
}

/// A process holding GPU memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub pid: u32,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub process_name: String,
    #[serde(default)]
    pub used_memory: Option<ProcessMemory>,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub gpu_name: String,
}

#[derive(Debug, Deserialize)]
struct GpuPayload {
    #[serde(default)]
    gpus: Option<Vec<GpuSample>>,
    #[serde(default)]
    processes: Option<Vec<ProcessSample>>,
}

/// Latest telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuReport {
    pub gpus: Vec<GpuSample>,
    pub processes: Vec<ProcessSample>,
    pub fetched_at: DateTime<Utc>,
}

/// Client for the GPU telemetry endpoint.
#[derive(Debug, Clone)]
pub struct GpuClient {
    fetcher: JsonFetcher,
}

impl GpuClient {
    pub fn new(fetcher: JsonFetcher) -> Self {
        Self { fetcher }
    }

    /// GET `url` and project it into a [`GpuReport`].
    pub async fn fetch(&self, url: &str) -> Result<GpuReport, FetchError> {
        let payload: GpuPayload = self.fetcher.get_json(url).await?;
        Ok(GpuReport {
            gpus: payload.gpus.unwrap_or_default(),
            processes: payload.processes.unwrap_or_default(),
            fetched_at: Utc::now(),
        })
    }
}

fn unknown() -> String {
    super::ollama::UNKNOWN.to_string()
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => unknown(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;

    #[test]
    fn test_parse_full_sample() {
        let payload: GpuPayload = serde_json::from_str(
            r#"{
                "gpus": [{
                    "index": 0, "name": "RTX 4090", "temperature": 54,
                    "gpu_utilization": 87.5, "memory_utilization": 40,
                    "memory_used": 9830, "memory_total": 24564, "power_draw": 301.2
                }],
                "processes": [
                    {"pid": 1234, "process_name": "ollama", "used_memory": 9000, "gpu_name": "RTX 4090"},
                    {"pid": 99, "process_name": "python", "used_memory": "512 MiB", "gpu_name": "RTX 4090"}
                ]
            }"#,
        )
        .unwrap();

        let gpus = payload.gpus.unwrap();
        assert_eq!(gpus[0].name, "RTX 4090");
        assert_eq!(gpus[0].gpu_util_pct, 87.5);
        assert_eq!(gpus[0].power_draw_w, 301.2);

        let processes = payload.processes.unwrap();
        assert_eq!(processes[0].used_memory, Some(ProcessMemory::Amount(9000.0)));
        assert_eq!(
            processes[1].used_memory,
            Some(ProcessMemory::Text("512 MiB".to_string()))
        );
        assert_eq!(processes[0].used_memory.as_ref().unwrap().to_string(), "9000");
    }

    #[test]
    fn test_parse_missing_fields_use_sentinels() {
        let sample: GpuSample = serde_json::from_str(r#"{"temperature": null}"#).unwrap();
        assert_eq!(sample.index, 0);
        assert_eq!(sample.name, "Unknown");
        assert_eq!(sample.temperature_c, 0.0);

        let process: ProcessSample = serde_json::from_str(r#"{"pid": "17"}"#).unwrap();
        assert_eq!(process.pid, 17);
        assert_eq!(process.process_name, "Unknown");
        assert!(process.used_memory.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_processes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/gpu-data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"gpus":[{"index":1,"name":"A100"}]}"#)
            .create_async()
            .await;

        let client = GpuClient::new(JsonFetcher::new(Duration::from_secs(5)).unwrap());
        let report = client
            .fetch(&format!("{}/api/gpu-data", server.url()))
            .await
            .unwrap();
        assert_eq!(report.gpus.len(), 1);
        assert!(report.processes.is_empty());
    }
}
