//! Model-runtime monitor

use super::view::{ViewChannel, ViewState};
use crate::config::EndpointConfig;
use crate::debug::{DebugLevel, DebugSink};
use crate::fetch::{FetchError, ModelReport, OllamaClient, UnloadMethod};
use crate::poller::RefreshCycle;
use crate::render::{self, DisplayModel};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Fetches, merges and renders the model list.
pub struct ModelMonitor {
    client: OllamaClient,
    sink: Arc<DebugSink>,
    origin: String,
    endpoint: RwLock<EndpointConfig>,
    last: Mutex<Option<Result<ModelReport, FetchError>>>,
    view: ViewChannel,
}

impl ModelMonitor {
    pub fn new(
        client: OllamaClient,
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
            view: ViewChannel::new("models", width, render::render_loading("models")),
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

    /// The configured base URL made absolute.
    pub fn base_url(&self) -> String {
        self.endpoint().absolute_url(&self.origin)
    }

    /// Run one fetch-and-render cycle.
    pub async fn refresh(&self) {
        let seq = self.view.begin();
        let base_url = self.base_url();
        self.sink.info(format!("Fetching data from {}", base_url));

        let result = self.client.fetch_models(&base_url).await;
        match &result {
            Ok(report) => {
                if let Some(e) = &report.tags_error {
                    self.sink.log(
                        DebugLevel::Warning,
                        format!("Error fetching available models: {}", e),
                        Some(json!({ "kind": e.kind() })),
                    );
                }
                if let Some(e) = &report.ps_error {
                    self.sink.log(
                        DebugLevel::Warning,
                        format!("Error detecting running models: {}", e),
                        Some(json!({ "kind": e.kind() })),
                    );
                }
                self.sink.info(format!(
                    "Rendering models view: {} running, {} available",
                    report.running_count(),
                    report.available_count
                ));
            }
            Err(e) => {
                self.sink.log(
                    DebugLevel::Error,
                    format!("Error: {}", e.summary()),
                    Some(json!({ "kind": e.kind(), "url": base_url })),
                );
            }
        }

        if !self.view.claim(seq) {
            self.sink.info(format!("Discarded superseded models cycle #{}", seq));
            return;
        }

        let fetched_at = match &result {
            Ok(report) => report.fetched_at,
            Err(_) => Utc::now(),
        };
        let display = self.display_for(&result, &base_url);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if self.view.publish(seq, display, fetched_at) {
            *last = Some(result);
        } else {
            drop(last);
            self.sink.info(format!("Discarded superseded models cycle #{}", seq));
        }
    }

    /// Change the viewport and re-render the last known data.
    pub fn resize(&self, width: u32) {
        self.view.set_width(width);
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = last.as_ref() {
            self.view.rerender(self.display_for(result, &self.base_url()));
        }
    }

    pub fn view(&self) -> ViewState {
        self.view.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Latest successful report, if any.
    pub fn last_report(&self) -> Option<ModelReport> {
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

    /// Ask the runtime to load `model`.
    pub async fn load_model(&self, model: &str) -> Result<(), FetchError> {
        self.sink.info(format!("Attempting to load model {}", model));
        match self.client.load_model(&self.base_url(), model).await {
            Ok(()) => {
                self.sink.info(format!("Model {} loaded successfully!", model));
                Ok(())
            }
            Err(e) => {
                self.sink.log(
                    DebugLevel::Error,
                    format!("Error loading model {}: {}", model, e),
                    None,
                );
                Err(e)
            }
        }
    }

    /// Best-effort unload of `model`.
    pub async fn stop_model(&self, model: &str) -> Result<UnloadMethod, FetchError> {
        self.sink.info(format!("Attempting to stop model {}", model));
        match self.client.unload_model(&self.base_url(), model).await {
            Ok(UnloadMethod::KeepAlive) => {
                self.sink
                    .info(format!("Model {} unloaded successfully!", model));
                Ok(UnloadMethod::KeepAlive)
            }
            Ok(UnloadMethod::Fallback) => {
                self.sink.info(format!(
                    "Alternative unload approach completed for {}",
                    model
                ));
                Ok(UnloadMethod::Fallback)
            }
            Err(e) => {
                self.sink.log(
                    DebugLevel::Error,
                    format!("Error stopping model {}: {}", model, e),
                    None,
                );
                Err(e)
            }
        }
    }

    fn display_for(
        &self,
        result: &Result<ModelReport, FetchError>,
        base_url: &str,
    ) -> DisplayModel {
        match result {
            Ok(report) => render::render_models(report, self.view.width(), Utc::now(), base_url),
            Err(e) => render::render_model_error(e, base_url),
        }
    }
}

#[async_trait]
impl RefreshCycle for ModelMonitor {
    fn name(&self) -> &'static str {
        "models"
    }

    async fn run_cycle(&self) {
        self.refresh().await;
    }
}
