//! Monitor session: the two views, their pollers, settings and debug log.

use super::{GpuMonitor, ModelMonitor};
use crate::config::{
    ConfigError, ConfigStore, EndpointConfig, EndpointSource, MonitorConfig, ServerDefaults,
};
use crate::debug::{DebugLevel, DebugSink};
use crate::fetch::{
    fetch_server_defaults, FetchError, GpuClient, JsonFetcher, OllamaClient, UnloadMethod,
};
use crate::poller::{Poller, PollerState, RefreshPolicy};
use crate::store::{keys, KeyValueStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Explicit context owning everything one monitoring session needs.
///
/// Build with [`MonitorSession::open`] for one-shot use or
/// [`MonitorSession::start`] to also run the initial cycles and start both
/// pollers. Call [`MonitorSession::shutdown`] when done; dropping the
/// session stops the timers as well.
pub struct MonitorSession {
    config: MonitorConfig,
    settings: ConfigStore,
    sink: Arc<DebugSink>,
    server_defaults: Option<ServerDefaults>,
    models: Arc<ModelMonitor>,
    gpu: Arc<GpuMonitor>,
    model_poller: Poller,
    gpu_poller: Poller,
}

impl MonitorSession {
    /// Open a session and start monitoring.
    pub async fn start(
        config: MonitorConfig,
        store: Arc<dyn KeyValueStore>,
        width: u32,
    ) -> Result<Self, FetchError> {
        let fetcher = JsonFetcher::new(Duration::from_secs(config.request_timeout_seconds))?;
        let session = Self::open(config, store, fetcher, width).await;
        session.begin().await;
        Ok(session)
    }

    /// Resolve settings and build both monitors without fetching any view
    /// data or starting timers.
    pub async fn open(
        config: MonitorConfig,
        store: Arc<dyn KeyValueStore>,
        fetcher: JsonFetcher,
        width: u32,
    ) -> Self {
        let sink = Arc::new(DebugSink::open(
            Arc::clone(&store),
            config.debug_retention,
            config.debug_persisted,
        ));
        let settings = ConfigStore::new(store);

        let server_defaults = if config.fetch_server_defaults {
            match fetch_server_defaults(&fetcher, &config.origin).await {
                Ok(defaults) => {
                    sink.log(
                        DebugLevel::Info,
                        "Loaded server configuration",
                        serde_json::to_value(&defaults).ok(),
                    );
                    Some(defaults)
                }
                Err(e) => {
                    sink.warning(format!("Failed to load config from server: {}", e));
                    None
                }
            }
        } else {
            None
        };

        let model_endpoint = settings.resolve_endpoint(
            keys::OLLAMA_API_URL,
            server_defaults.as_ref().map(ServerDefaults::ollama_url).as_deref(),
            &config.ollama_url,
        );
        let gpu_endpoint = settings.resolve_endpoint(
            keys::GPU_API_URL,
            server_defaults.as_ref().and_then(ServerDefaults::gpu_url).as_deref(),
            &config.gpu_url,
        );
        let interval = settings.resolve_interval(config.refresh_interval_seconds);
        let policy = RefreshPolicy::new(interval).unwrap_or_default();

        tracing::info!(
            models = %model_endpoint.base_url,
            models_source = ?model_endpoint.source,
            gpu = %gpu_endpoint.base_url,
            gpu_source = ?gpu_endpoint.source,
            interval_seconds = policy.interval_seconds(),
            "Monitor settings resolved"
        );

        let models = Arc::new(ModelMonitor::new(
            OllamaClient::new(fetcher.clone()),
            Arc::clone(&sink),
            config.origin.clone(),
            model_endpoint,
            width,
        ));
        let gpu = Arc::new(GpuMonitor::new(
            GpuClient::new(fetcher),
            Arc::clone(&sink),
            config.origin.clone(),
            gpu_endpoint,
            width,
        ));
        let model_poller = Poller::new(models.clone(), policy);
        let gpu_poller = Poller::new(gpu.clone(), policy);

        Self {
            config,
            settings,
            sink,
            server_defaults,
            models,
            gpu,
            model_poller,
            gpu_poller,
        }
    }

    /// Run the initial cycle of each view, then start both pollers.
    pub async fn begin(&self) {
        tokio::join!(self.models.refresh(), self.gpu.refresh());
        let policy = self.policy();
        self.model_poller.start(policy);
        self.gpu_poller.start(policy);
        self.sink.info(format!(
            "Auto-refresh every {} seconds",
            policy.interval_seconds()
        ));
    }

    pub fn models(&self) -> &Arc<ModelMonitor> {
        &self.models
    }

    pub fn gpu(&self) -> &Arc<GpuMonitor> {
        &self.gpu
    }

    pub fn sink(&self) -> &Arc<DebugSink> {
        &self.sink
    }

    pub fn settings(&self) -> &ConfigStore {
        &self.settings
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Defaults served by `/api/config`, when they could be fetched.
    pub fn server_defaults(&self) -> Option<&ServerDefaults> {
        self.server_defaults.as_ref()
    }

    /// Current refresh policy, shared by both views.
    pub fn policy(&self) -> RefreshPolicy {
        self.model_poller.policy()
    }

    pub fn model_countdown(&self) -> watch::Receiver<u32> {
        self.model_poller.subscribe_countdown()
    }

    pub fn gpu_countdown(&self) -> watch::Receiver<u32> {
        self.gpu_poller.subscribe_countdown()
    }

    pub fn is_running(&self) -> bool {
        self.model_poller.state() == PollerState::Running
            || self.gpu_poller.state() == PollerState::Running
    }

    /// Save new endpoints. Blank values are ignored.
    ///
    /// Returns true when at least one endpoint was saved; the changed views
    /// are re-fetched and their timers restarted.
    pub async fn save_endpoints(&self, models: Option<&str>, gpu: Option<&str>) -> bool {
        let models_saved = models.is_some_and(|url| {
            self.save_endpoint(keys::OLLAMA_API_URL, url, |e| self.models.set_endpoint(e))
        });
        let gpu_saved = gpu.is_some_and(|url| {
            self.save_endpoint(keys::GPU_API_URL, url, |e| self.gpu.set_endpoint(e))
        });

        if !models_saved && !gpu_saved {
            self.sink.warning("No endpoint saved: enter a non-empty URL");
            return false;
        }

        self.sink.info("Configuration saved, fetching new data...");
        match (models_saved, gpu_saved) {
            (true, true) => {
                tokio::join!(self.models.refresh(), self.gpu.refresh());
            }
            (true, false) => self.models.refresh().await,
            _ => self.gpu.refresh().await,
        }
        // Only a running session has timers to restart
        if self.is_running() {
            if models_saved {
                self.model_poller.restart();
            }
            if gpu_saved {
                self.gpu_poller.restart();
            }
        }
        true
    }

    fn save_endpoint(&self, key: &str, url: &str, apply: impl FnOnce(EndpointConfig)) -> bool {
        if !self.settings.save(key, url) {
            return false;
        }
        let url = url.trim();
        apply(EndpointConfig::new(url, EndpointSource::Stored));
        self.sink.info(format!("{} updated to: {}", key, url));
        true
    }

    /// Validate, persist and apply a new refresh interval to both pollers.
    ///
    /// Out-of-range values leave the stored setting and the policy untouched.
    pub fn save_refresh_interval(&self, seconds: i64) -> Result<u32, ConfigError> {
        match self.settings.save_interval(seconds) {
            Ok(seconds) => {
                let policy = RefreshPolicy::new(seconds)?;
                if self.is_running() {
                    self.model_poller.reset(policy);
                    self.gpu_poller.reset(policy);
                } else {
                    self.model_poller.set_policy(policy);
                    self.gpu_poller.set_policy(policy);
                }
                self.sink.info(format!(
                    "Auto-refresh interval updated to {} seconds",
                    seconds
                ));
                Ok(seconds)
            }
            Err(e @ ConfigError::Validation { .. }) => {
                self.sink.log(
                    DebugLevel::Warning,
                    "Please enter a value between 5 and 300 seconds",
                    Some(json!({ "rejected": seconds })),
                );
                Err(e)
            }
            Err(e) => {
                self.sink.log(
                    DebugLevel::Error,
                    format!("Failed to save refresh interval: {}", e),
                    Some(json!({ "seconds": seconds })),
                );
                Err(e)
            }
        }
    }

    /// Re-fetch both views now and restart both countdowns.
    pub async fn refresh_now(&self) {
        if self.is_running() {
            self.model_poller.restart();
            self.gpu_poller.restart();
        }
        tokio::join!(self.models.refresh(), self.gpu.refresh());
    }

    /// Re-fetch only the model view.
    pub async fn refresh_models(&self) {
        self.models.refresh().await;
    }

    /// Re-fetch only the GPU view.
    pub async fn refresh_gpu(&self) {
        self.gpu.refresh().await;
    }

    /// Apply a new viewport width.
    ///
    /// Both views re-render from their last data; with
    /// `refetch_on_resize` they are also re-fetched.
    pub async fn resize(&self, width: u32) {
        self.models.resize(width);
        self.gpu.resize(width);
        if self.config.refetch_on_resize {
            tokio::join!(self.models.refresh(), self.gpu.refresh());
        }
    }

    /// Load `model`, then refresh the model view.
    pub async fn load_model(&self, model: &str) -> Result<(), FetchError> {
        let result = self.models.load_model(model).await;
        self.models.refresh().await;
        result
    }

    /// Unload `model`, then refresh the model view.
    pub async fn stop_model(&self, model: &str) -> Result<UnloadMethod, FetchError> {
        let result = self.models.stop_model(model).await;
        self.models.refresh().await;
        result
    }

    /// Stop both pollers and wait for their timers to exit.
    pub async fn shutdown(&self) {
        self.model_poller.shutdown().await;
        self.gpu_poller.shutdown().await;
        tracing::info!("Monitor session stopped");
    }
}
