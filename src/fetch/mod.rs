//! HTTP data sources.
//!
//! [`JsonFetcher`] implements the request pipeline shared by every source;
//! [`OllamaClient`] and [`GpuClient`] project its JSON into view models.

mod client;
mod defaults;
mod error;
mod gpu;
mod ollama;

pub use client::{JsonFetcher, BODY_PREVIEW_CHARS};
pub use defaults::{fetch_server_defaults, CONFIG_PATH};
pub use error::FetchError;
pub use gpu::{GpuClient, GpuReport, GpuSample, ProcessMemory, ProcessSample};
pub use ollama::{
    merge_models, ModelReport, OllamaClient, RawModel, RawModelDetails, RuntimeItem,
    UnloadMethod, ESTIMATED_RUN_SECONDS, UNKNOWN,
};
