//! Configuration module for LLMSwitch
//!
//! Provides layered configuration loading from files, environment variables, and defaults,
//! plus the persisted per-user settings in [`ConfigStore`].
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`OLLAMA_HOST`, `PORT`, `LLMSWITCH_*`, ...)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use llmswitch::config::LlmSwitchConfig;
//!
//! let config = LlmSwitchConfig::default();
//! assert_eq!(config.server.port, 8000);
//!
//! let toml = r#"
//! [monitor]
//! refresh_interval_seconds = 10
//! "#;
//! let config: LlmSwitchConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.monitor.refresh_interval_seconds, 10);
//! ```

pub mod defaults;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod server;
pub mod store;
pub mod upstream;

pub use defaults::ServerDefaults;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use monitor::{MonitorConfig, DEFAULT_OLLAMA_URL, GPU_PLACEHOLDER_URL};
pub use server::ServerConfig;
pub use store::{ConfigStore, EndpointConfig, EndpointSource};
pub use upstream::UpstreamConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the file server and the monitor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmSwitchConfig {
    /// Static file server
    pub server: ServerConfig,
    /// Upstream locations advertised on `/api/config`
    pub upstream: UpstreamConfig,
    /// Polling monitor
    pub monitor: MonitorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl LlmSwitchConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(Some(path))
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    ///
    /// Honors the variable names the dashboard server has always used
    /// (`SERVER_HOST`, `PORT`, `OLLAMA_HOST`, ...) plus `LLMSWITCH_*`.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Server settings
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Advertised upstreams
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            self.upstream.ollama_host = host;
        }
        if let Ok(port) = std::env::var("OLLAMA_PORT") {
            self.upstream.ollama_port = port;
        }
        if let Ok(host) = std::env::var("GPU_API_HOST") {
            self.upstream.gpu_api_host = host;
        }
        if let Ok(port) = std::env::var("GPU_API_PORT") {
            self.upstream.gpu_api_port = port;
        }

        // Monitor settings
        if let Ok(origin) = std::env::var("LLMSWITCH_ORIGIN") {
            self.monitor.origin = origin;
        }
        if let Ok(path) = std::env::var("LLMSWITCH_STATE_FILE") {
            self.monitor.state_file = path.into();
        }

        // Logging settings
        if let Ok(level) = std::env::var("LLMSWITCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LLMSWITCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation("server.port", "port must be non-zero"));
        }

        crate::poller::validate_interval(i64::from(self.monitor.refresh_interval_seconds))
            .map_err(|_| {
                ConfigError::validation(
                    "monitor.refresh_interval_seconds",
                    "must be between 5 and 300 seconds",
                )
            })?;

        if self.monitor.request_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "monitor.request_timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        if self.monitor.ollama_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "monitor.ollama_url",
                "URL cannot be empty",
            ));
        }

        if self.monitor.debug_retention == 0 {
            return Err(ConfigError::validation(
                "monitor.debug_retention",
                "retention must be non-zero",
            ));
        }
        if self.monitor.debug_persisted > self.monitor.debug_retention {
            return Err(ConfigError::validation(
                "monitor.debug_persisted",
                "cannot exceed monitor.debug_retention",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests touching them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_defaults() {
        let config = LlmSwitchConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.ollama_port, "11434");
        assert_eq!(config.monitor.refresh_interval_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [server]
        port = 9000
        "#;

        let config: LlmSwitchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "localhost"); // Default
    }

    #[test]
    fn test_config_parse_example_toml() {
        let toml = include_str!("../../llmswitch.example.toml");
        let config: LlmSwitchConfig = toml::from_str(toml).unwrap();
        assert!(config.server.port > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[monitor]\nrefresh_interval_seconds = 12").unwrap();

        let config = LlmSwitchConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.monitor.refresh_interval_seconds, 12);
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = LlmSwitchConfig::load(Some(Path::new("/nonexistent/llmswitch.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_load_or_default_missing_file() {
        let config =
            LlmSwitchConfig::load_or_default(Path::new("/nonexistent/llmswitch.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_config_invalid_toml() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport = ").unwrap();
        let result = LlmSwitchConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_env_override_upstream() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("OLLAMA_HOST", "test-ollama");
        std::env::set_var("OLLAMA_PORT", "12345");
        std::env::set_var("GPU_API_HOST", "test-gpu");
        std::env::set_var("GPU_API_PORT", "6789");
        let config = LlmSwitchConfig::default().with_env_overrides();
        std::env::remove_var("OLLAMA_HOST");
        std::env::remove_var("OLLAMA_PORT");
        std::env::remove_var("GPU_API_HOST");
        std::env::remove_var("GPU_API_PORT");

        assert_eq!(config.upstream.ollama_host, "test-ollama");
        assert_eq!(config.upstream.ollama_port, "12345");
        assert_eq!(config.upstream.gpu_api_host, "test-gpu");
        assert_eq!(config.upstream.gpu_api_port, "6789");
    }

    #[test]
    fn test_config_env_override_port() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("PORT", "9999");
        let config = LlmSwitchConfig::default().with_env_overrides();
        std::env::remove_var("PORT");

        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_config_env_invalid_value_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("PORT", "not-a-number");
        let config = LlmSwitchConfig::default().with_env_overrides();
        std::env::remove_var("PORT");

        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_config_env_override_log_format() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("LLMSWITCH_LOG_FORMAT", "json");
        let config = LlmSwitchConfig::default().with_env_overrides();
        assert_eq!(config.logging.format, LogFormat::Json);

        std::env::set_var("LLMSWITCH_LOG_FORMAT", "xml");
        let config = LlmSwitchConfig::default().with_env_overrides();
        std::env::remove_var("LLMSWITCH_LOG_FORMAT");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_validation_zero_port() {
        let mut config = LlmSwitchConfig::default();
        config.server.port = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "server.port"
        ));
    }

    #[test]
    fn test_config_validation_interval_range() {
        let mut config = LlmSwitchConfig::default();
        config.monitor.refresh_interval_seconds = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field.contains("refresh_interval")
        ));

        config.monitor.refresh_interval_seconds = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_debug_sizes() {
        let mut config = LlmSwitchConfig::default();
        config.monitor.debug_persisted = 2000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "monitor.debug_persisted"
        ));
    }

    #[test]
    fn test_config_validation_empty_ollama_url() {
        let mut config = LlmSwitchConfig::default();
        config.monitor.ollama_url = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field.contains("ollama_url")
        ));
    }
}
