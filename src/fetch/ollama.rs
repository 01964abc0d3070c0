//! Model-runtime (Ollama) data source.

use super::{FetchError, JsonFetcher};
use crate::endpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;

/// Seconds subtracted from the fetch time to estimate when a running model
/// was loaded. `/api/ps` does not report a start time.
pub const ESTIMATED_RUN_SECONDS: i64 = 300;

/// Sentinel shown for missing textual fields.
pub const UNKNOWN: &str = "Unknown";

/// `details` object attached to tags and ps entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawModelDetails {
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

/// One entry of `/api/tags` or `/api/ps`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub name: Option<String>,
    /// `/api/ps` sometimes only carries `model`
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub details: Option<RawModelDetails>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Option<Vec<RawModel>>,
}

/// A model as shown in the view, running or stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeItem {
    pub name: String,
    pub id: String,
    /// Estimated load time, epoch seconds. `None` for stopped models.
    pub started_at: Option<i64>,
    pub size_bytes: u64,
    pub param_size: String,
    pub quantization: Option<String>,
    pub running: bool,
}

impl RuntimeItem {
    /// Project a `/api/ps` entry.
    pub fn running(raw: &RawModel, fetched_at: DateTime<Utc>) -> Self {
        let mut item = Self::project(raw);
        if item.id.is_empty() {
            item.id = format!("model-{}", fetched_at.timestamp_millis());
        }
        item.started_at = Some(fetched_at.timestamp() - ESTIMATED_RUN_SECONDS);
        item.running = true;
        item
    }

    /// Project a `/api/tags` entry.
    pub fn stopped(raw: &RawModel) -> Self {
        Self::project(raw)
    }

    fn project(raw: &RawModel) -> Self {
        let name = raw
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(raw.model.as_deref())
            .unwrap_or_default()
            .to_string();
        let details = raw.details.clone().unwrap_or_default();
        Self {
            name,
            id: raw.digest.clone().unwrap_or_default(),
            started_at: None,
            size_bytes: raw.size.unwrap_or(0),
            param_size: details
                .parameter_size
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            quantization: details.quantization_level.filter(|q| !q.is_empty()),
            running: false,
        }
    }
}

/// Combine the all-models and running-models lists.
///
/// Running entries come first in running-list order, followed by the
/// remaining all-list entries in their order. A name appears at most once;
/// within one list the first occurrence wins, across lists the running entry
/// wins.
pub fn merge_models(all: &[RuntimeItem], running: &[RuntimeItem]) -> Vec<RuntimeItem> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(all.len() + running.len());

    for item in running {
        if seen.insert(item.name.as_str()) {
            merged.push(RuntimeItem {
                running: true,
                ..item.clone()
            });
        }
    }
    for item in all {
        if seen.insert(item.name.as_str()) {
            merged.push(RuntimeItem {
                running: false,
                started_at: None,
                ..item.clone()
            });
        }
    }
    merged
}

/// Result of one model-runtime cycle. Individual list failures are kept
/// alongside whatever data did arrive.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub items: Vec<RuntimeItem>,
    pub available_count: usize,
    pub tags_error: Option<FetchError>,
    pub ps_error: Option<FetchError>,
    pub fetched_at: DateTime<Utc>,
}

impl ModelReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.items.iter().filter(|i| i.running).count()
    }

    pub fn stopped_count(&self) -> usize {
        self.items.iter().filter(|i| !i.running).count()
    }
}

/// Which unload request the runtime accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadMethod {
    /// `keep_alive: 0`
    KeepAlive,
    /// Generate request with GPU layers disabled
    Fallback,
}

/// Client for the model-runtime endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    fetcher: JsonFetcher,
}

impl OllamaClient {
    pub fn new(fetcher: JsonFetcher) -> Self {
        Self { fetcher }
    }

    /// Query `/api/tags` and `/api/ps` concurrently and merge the results.
    ///
    /// Only a missing base URL fails the whole call; list failures are
    /// reported on the returned [`ModelReport`].
    pub async fn fetch_models(&self, base_url: &str) -> Result<ModelReport, FetchError> {
        if base_url.trim().is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let tags_url = endpoint::join(base_url, "/api/tags");
        let ps_url = endpoint::join(base_url, "/api/ps");
        let (tags, ps) = tokio::join!(
            self.fetcher.get_json::<ModelList>(&tags_url),
            self.fetcher.get_json::<ModelList>(&ps_url)
        );
        let fetched_at = Utc::now();

        let (all, tags_error) = match tags {
            Ok(list) => (
                list.models
                    .unwrap_or_default()
                    .iter()
                    .map(RuntimeItem::stopped)
                    .collect::<Vec<_>>(),
                None,
            ),
            Err(e) => {
                tracing::warn!(url = %tags_url, error = %e, "Available models fetch failed");
                (Vec::new(), Some(e))
            }
        };

        let (running, ps_error) = match ps {
            Ok(list) => (
                list.models
                    .unwrap_or_default()
                    .iter()
                    .map(|raw| RuntimeItem::running(raw, fetched_at))
                    .collect::<Vec<_>>(),
                None,
            ),
            Err(e) => {
                tracing::warn!(url = %ps_url, error = %e, "Running models fetch failed");
                (Vec::new(), Some(e))
            }
        };

        Ok(ModelReport {
            items: merge_models(&all, &running),
            available_count: all.len(),
            tags_error,
            ps_error,
            fetched_at,
        })
    }

    /// Ask the runtime to load `model` into memory.
    pub async fn load_model(&self, base_url: &str, model: &str) -> Result<(), FetchError> {
        let url = generate_url(base_url)?;
        self.fetcher.post_json(&url, &json!({ "model": model })).await?;
        tracing::info!(model, "Model loaded");
        Ok(())
    }

    /// Best-effort unload of `model`.
    ///
    /// Tries `keep_alive: 0` first, then a generate request that moves every
    /// layer off the GPU. Fails only when both are rejected.
    pub async fn unload_model(
        &self,
        base_url: &str,
        model: &str,
    ) -> Result<UnloadMethod, FetchError> {
        let url = generate_url(base_url)?;

        let first = self
            .fetcher
            .post_json(&url, &json!({ "model": model, "keep_alive": 0 }))
            .await;
        match first {
            Ok(()) => {
                tracing::info!(model, "Model unloaded");
                return Ok(UnloadMethod::KeepAlive);
            }
            Err(e) => {
                tracing::debug!(model, error = %e, "Standard unload failed, trying fallback");
            }
        }

        let fallback = json!({
            "model": model,
            "prompt": "unload model",
            "options": { "num_gpu": 0, "num_keep": 0 }
        });
        self.fetcher.post_json(&url, &fallback).await?;
        tracing::info!(model, "Model unload requested via fallback");
        Ok(UnloadMethod::Fallback)
    }
}

fn generate_url(base_url: &str) -> Result<String, FetchError> {
    if base_url.trim().is_empty() {
        return Err(FetchError::NotConfigured);
    }
    Ok(endpoint::join(base_url, "/api/generate"))
}
