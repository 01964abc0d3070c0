//! Shared test utilities for LLMSwitch integration tests.
//!
//! Provides mock Ollama and GPU servers, monitor configs pointed at them,
//! and session builders backed by an in-memory store.

#![allow(dead_code)]

use llmswitch::config::MonitorConfig;
use llmswitch::fetch::JsonFetcher;
use llmswitch::monitor::MonitorSession;
use llmswitch::store::{KeyValueStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Viewport wide enough for the table layout.
pub const DESKTOP_WIDTH: u32 = 1280;

/// Viewport narrow enough for the card layout.
pub const MOBILE_WIDTH: u32 = 375;

// =============================================================================
// Payload Builders
// =============================================================================

/// `/api/tags` body listing `names`.
pub fn tags_body(names: &[&str]) -> Value {
    let models: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "name": name,
                "model": name,
                "digest": format!("{:064x}", i + 1),
                "size": 4_700_000_000u64,
                "details": {
                    "parameter_size": "8B",
                    "quantization_level": "Q4_0"
                }
            })
        })
        .collect();
    json!({ "models": models })
}

/// `/api/ps` body listing `names` as loaded.
pub fn ps_body(names: &[&str]) -> Value {
    tags_body(names)
}

/// Telemetry body with one GPU and one process.
pub fn gpu_body() -> Value {
    json!({
        "gpus": [{
            "index": 0,
            "name": "NVIDIA GeForce RTX 4090",
            "temperature": 61,
            "gpu_utilization": 87.5,
            "memory_utilization": 40,
            "memory_used": 9830,
            "memory_total": 24564,
            "power_draw": 310.2
        }],
        "processes": [{
            "pid": 4242,
            "process_name": "ollama_llama_server",
            "used_memory": 9216,
            "gpu_name": "NVIDIA GeForce RTX 4090"
        }]
    })
}

// =============================================================================
// Mock Servers
// =============================================================================

/// Start a mock Ollama runtime answering `/api/tags` and `/api/ps`.
pub async fn mock_ollama(all: &[&str], running: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(all)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ps_body(running)))
        .mount(&server)
        .await;
    server
}

/// Start a mock GPU telemetry service on `/api/gpu-data`.
pub async fn mock_gpu() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gpu-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gpu_body()))
        .mount(&server)
        .await;
    server
}

// =============================================================================
// Session Builders
// =============================================================================

/// Monitor config that never contacts a dashboard server.
pub fn monitor_config(ollama_url: &str, gpu_url: &str) -> MonitorConfig {
    MonitorConfig {
        origin: "http://127.0.0.1:9".to_string(),
        ollama_url: ollama_url.to_string(),
        gpu_url: gpu_url.to_string(),
        refresh_interval_seconds: 30,
        request_timeout_seconds: 2,
        fetch_server_defaults: false,
        refetch_on_resize: false,
        ..MonitorConfig::default()
    }
}

pub fn fetcher() -> JsonFetcher {
    JsonFetcher::new(Duration::from_secs(2)).unwrap()
}

/// Open (without starting) a session over a fresh in-memory store.
pub async fn open_session(config: MonitorConfig) -> (MonitorSession, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let session = open_session_with_store(config, store.clone()).await;
    (session, store)
}

pub async fn open_session_with_store(
    config: MonitorConfig,
    store: Arc<dyn KeyValueStore>,
) -> MonitorSession {
    MonitorSession::open(config, store, fetcher(), DESKTOP_WIDTH).await
}
