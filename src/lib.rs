//! LLMSwitch - Ollama model and GPU telemetry monitor
//!
//! This library polls an Ollama runtime and a GPU telemetry endpoint on a
//! shared interval, renders both into layout-aware view models, keeps a
//! persisted debug log, and serves the browser dashboard.

pub mod cli;
pub mod config;
pub mod debug;
pub mod endpoint;
pub mod fetch;
pub mod logging;
pub mod monitor;
pub mod poller;
pub mod render;
pub mod server;
pub mod store;
