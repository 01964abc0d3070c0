//! GPU telemetry monitor

use super::view::{ViewChannel, ViewState};
use crate::config::EndpointConfig;
use crate::debug::{DebugLevel, DebugSink};
use crate::fetch::{FetchError, GpuClient, GpuReport};
use crate::poller::RefreshCycle;
use crate::render::{self, DisplayModel};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Fetches and renders GPU telemetry.
pub struct GpuMonitor {
    client: GpuClient,
    sink: Arc<DebugSink>,
    origin: String,
    endpoint: RwLock<EndpointConfig>,
    last: Mutex<Option<Result<GpuReport, FetchError>>>,
    view: ViewChannel,
}

impl GpuMonitor {
    pub fn new(
        client: GpuClient,
        sink: Arc<DebugSink>,
        origin: impl Into<String>,
        endpoint: EndpointConfig,
        width: u32,
    ) -> Self {
        Self {
            client,
            sink,
            origin: origin.into(),
            endpoint: RwLock::new(endpoint),
            last: Mutex::new(None),
            view: ViewChannel::new("gpu", width, render::render_loading("GPU data")),
        }
    }

    pub fn endpoint(&self) -> EndpointConfig {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_endpoint(&self, endpoint: EndpointConfig) {
        *self.endpoint.write().unwrap_or_else(PoisonError::into_inner) = endpoint;
    }

    /// Absolute endpoint URL, empty while unset or still the placeholder.
    pub fn url(&self) -> String {
        let endpoint = self.endpoint();
        if endpoint.is_configured() {
            endpoint.absolute_url(&self.origin)
        } else {
            String::new()
        }
    }

    /// Run one fetch-and-render cycle.
    ///
    /// A failed fetch adds exactly one error-level debug entry.
    pub async fn refresh(&self) {
        let seq = self.view.begin();
        let url = self.url();

        let result = if url.is_empty() {
            self.sink.info("[GPU] Endpoint not configured, skipping fetch");
            Err(FetchError::NotConfigured)
        } else {
            self.sink.info(format!("[GPU] Fetching GPU data from {}", url));
            let result = self.client.fetch(&url).await;
            match &result {
                Ok(report) => self.sink.info(format!(
                    "[GPU] GPU data received: {} GPUs, {} processes",
                    report.gpus.len(),
                    report.processes.len()
                )),
                Err(e) => self.sink.log(
                    DebugLevel::Error,
                    format!("[GPU] GPU Error: {}", e.summary()),
                    Some(json!({ "kind": e.kind(), "url": url })),
                ),
            }
            result
        };

        if !self.view.claim(seq) {
            self.sink.info(format!("[GPU] Discarded superseded GPU cycle #{}", seq));
            return;
        }

        let fetched_at = match &result {
            Ok(report) => report.fetched_at,
            Err(_) => Utc::now(),
        };
        let display = self.display_for(&result, &url);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if self.view.publish(seq, display, fetched_at) {
            *last = Some(result);
        } else {
            drop(last);
            self.sink.info(format!("[GPU] Discarded superseded GPU cycle #{}", seq));
        }
    }

    /// Change the viewport and re-render the last known data.
    pub fn resize(&self, width: u32) {
        self.view.set_width(width);
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = last.as_ref() {
            self.view.rerender(self.display_for(result, &self.url()));
        }
    }

    pub fn view(&self) -> ViewState {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Latest successful report, if any.
    pub fn last_report(&self) -> Option<GpuReport> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|r| r.as_ref().ok().cloned())
    }

    /// Failure of the latest published cycle, if it failed.
    pub fn last_error(&self) -> Option<FetchError> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|r| r.as_ref().err().cloned())
    }

    fn display_for(&self, result: &Result<GpuReport, FetchError>, url: &str) -> DisplayModel {
        match result {
            Ok(report) => render::render_gpu(report, self.view.width()),
            Err(e) => render::render_gpu_error(e, url),
        }
    }
}

#[async_trait]
impl RefreshCycle for GpuMonitor {
    fn name(&self) -> &'static str {
        "gpu"
    }

    async fn run_cycle(&self) {
        self.refresh().await;
    }
}
