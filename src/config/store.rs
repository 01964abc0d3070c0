//! Persisted user settings.
//!
//! Wraps the key-value store with the resolution rules for endpoints and the
//! refresh interval. A stored value always wins over server-provided and
//! hard-coded defaults; blank input is never persisted.

use super::error::ConfigError;
use super::monitor::GPU_PLACEHOLDER_URL;
use crate::endpoint;
use crate::poller::validate_interval;
use crate::store::{keys, KeyValueStore};
use serde::Serialize;
use std::sync::Arc;

/// Where the active endpoint value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointSource {
    /// Saved by the user
    Stored,
    /// Supplied by the dashboard server's `/api/config`
    ServerDefault,
    /// Compiled-in or configuration-file fallback
    HardDefault,
}

/// Resolved endpoint for one monitored API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub source: EndpointSource,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, source: EndpointSource) -> Self {
        Self {
            base_url: base_url.into(),
            source,
        }
    }

    /// The base URL made absolute against `origin`. Empty when unset.
    pub fn absolute_url(&self, origin: &str) -> String {
        endpoint::normalize(&self.base_url, origin)
    }

    /// True for the GPU placeholder address, which nobody can actually serve.
    pub fn is_placeholder(&self) -> bool {
        self.base_url.trim() == GPU_PLACEHOLDER_URL
    }

    /// Whether the endpoint is usable for fetching at all.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.is_placeholder()
    }
}

/// Settings facade over the shared key-value store.
#[derive(Clone)]
pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConfigStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The persisted value for `key`, trimmed, or `None` when absent or blank.
    pub fn stored(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Persisted value for `key`, falling back to `hard_default`.
    pub fn resolve(&self, key: &str, hard_default: &str) -> String {
        self.stored(key)
            .unwrap_or_else(|| hard_default.to_string())
    }

    /// Trim and persist `value`.
    ///
    /// Returns false without touching the store when the value is blank or
    /// the write fails.
    pub fn save(&self, key: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            tracing::debug!(key, "Rejected blank setting");
            return false;
        }
        match self.store.set(key, value) {
            Ok(()) => {
                tracing::info!(key, value, "Setting saved");
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to persist setting");
                false
            }
        }
    }

    /// Resolve an endpoint: persisted value, then server default, then
    /// `hard_default`.
    pub fn resolve_endpoint(
        &self,
        key: &str,
        server_default: Option<&str>,
        hard_default: &str,
    ) -> EndpointConfig {
        if let Some(stored) = self.stored(key) {
            return EndpointConfig::new(stored, EndpointSource::Stored);
        }
        match server_default.map(str::trim).filter(|v| !v.is_empty()) {
            Some(remote) => EndpointConfig::new(remote, EndpointSource::ServerDefault),
            None => EndpointConfig::new(hard_default, EndpointSource::HardDefault),
        }
    }

    /// Stored refresh interval, or `default` when missing or unusable.
    pub fn resolve_interval(&self, default: u32) -> u32 {
        self.stored(keys::REFRESH_INTERVAL)
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|seconds| validate_interval(seconds).ok())
            .unwrap_or(default)
    }

    /// Validate and persist a new refresh interval.
    pub fn save_interval(&self, seconds: i64) -> Result<u32, ConfigError> {
        let seconds = validate_interval(seconds)?;
        self.store
            .set(keys::REFRESH_INTERVAL, &seconds.to_string())?;
        tracing::info!(seconds, "Refresh interval saved");
        Ok(seconds)
    }

    /// Parse raw user input as an interval, then save it.
    pub fn save_interval_input(&self, input: &str) -> Result<u32, ConfigError> {
        let seconds = input.trim().parse::<i64>().map_err(|_| {
            ConfigError::validation(keys::REFRESH_INTERVAL, "must be a whole number of seconds")
        })?;
        self.save_interval(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config_store() -> (Arc<MemoryStore>, ConfigStore) {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::new(store.clone());
        (store, config)
    }

    #[test]
    fn test_resolve_missing_uses_default() {
        let (_, config) = config_store();
        assert_eq!(
            config.resolve(keys::OLLAMA_API_URL, "http://localhost:11434"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn test_resolve_blank_uses_default() {
        let (store, config) = config_store();
        store.set(keys::OLLAMA_API_URL, "   ").unwrap();
        assert_eq!(config.resolve(keys::OLLAMA_API_URL, "fallback"), "fallback");
    }

    #[test]
    fn test_save_rejects_empty_and_whitespace() {
        let (store, config) = config_store();
        assert!(!config.save(keys::GPU_API_URL, ""));
        assert!(!config.save(keys::GPU_API_URL, "   "));
        assert!(store.get(keys::GPU_API_URL).is_none());
    }

    #[test]
    fn test_save_trims() {
        let (store, config) = config_store();
        assert!(config.save(keys::GPU_API_URL, "  x  "));
        assert_eq!(store.get(keys::GPU_API_URL).as_deref(), Some("x"));
    }

    #[test]
    fn test_save_reports_store_failure() {
        let store = Arc::new(MemoryStore::with_quota(3));
        let config = ConfigStore::new(store.clone());
        assert!(!config.save(keys::OLLAMA_API_URL, "http://localhost:11434"));
        assert!(store.get(keys::OLLAMA_API_URL).is_none());
    }

    #[test]
    fn test_resolve_endpoint_precedence() {
        let (store, config) = config_store();

        let endpoint = config.resolve_endpoint(keys::OLLAMA_API_URL, None, "http://hard:1");
        assert_eq!(endpoint, EndpointConfig::new("http://hard:1", EndpointSource::HardDefault));

        let endpoint =
            config.resolve_endpoint(keys::OLLAMA_API_URL, Some("http://h:1"), "http://hard:1");
        assert_eq!(endpoint, EndpointConfig::new("http://h:1", EndpointSource::ServerDefault));

        store.set(keys::OLLAMA_API_URL, "http://mine:2").unwrap();
        let endpoint =
            config.resolve_endpoint(keys::OLLAMA_API_URL, Some("http://h:1"), "http://hard:1");
        assert_eq!(endpoint, EndpointConfig::new("http://mine:2", EndpointSource::Stored));
    }

    #[test]
    fn test_resolve_endpoint_blank_server_default_ignored() {
        let (_, config) = config_store();
        let endpoint = config.resolve_endpoint(keys::GPU_API_URL, Some("  "), GPU_PLACEHOLDER_URL);
        assert_eq!(endpoint.source, EndpointSource::HardDefault);
        assert!(endpoint.is_placeholder());
        assert!(!endpoint.is_configured());
    }

    #[test]
    fn test_resolve_interval() {
        let (store, config) = config_store();
        assert_eq!(config.resolve_interval(30), 30);

        store.set(keys::REFRESH_INTERVAL, "45").unwrap();
        assert_eq!(config.resolve_interval(30), 45);

        store.set(keys::REFRESH_INTERVAL, "abc").unwrap();
        assert_eq!(config.resolve_interval(30), 30);

        store.set(keys::REFRESH_INTERVAL, "0").unwrap();
        assert_eq!(config.resolve_interval(30), 30);

        store.set(keys::REFRESH_INTERVAL, "1000").unwrap();
        assert_eq!(config.resolve_interval(30), 30);
    }

    #[test]
    fn test_save_interval_bounds() {
        let (store, config) = config_store();
        assert_eq!(config.save_interval(5).unwrap(), 5);
        assert_eq!(config.save_interval(300).unwrap(), 300);

        assert!(matches!(
            config.save_interval(4),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            config.save_interval(301),
            Err(ConfigError::Validation { .. })
        ));
        // Rejected values leave the last good one in place
        assert_eq!(store.get(keys::REFRESH_INTERVAL).as_deref(), Some("300"));
    }

    #[test]
    fn test_save_interval_input_parses() {
        let (_, config) = config_store();
        assert_eq!(config.save_interval_input(" 60 ").unwrap(), 60);
        assert!(matches!(
            config.save_interval_input("sixty"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_endpoint_absolute_url() {
        let endpoint = EndpointConfig::new("gpu-box:5000/api/gpu-data", EndpointSource::Stored);
        assert_eq!(
            endpoint.absolute_url("http://localhost:8000"),
            "http://gpu-box:5000/api/gpu-data"
        );
        assert!(endpoint.is_configured());
    }
}
