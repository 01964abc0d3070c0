//! JSON-over-HTTP request pipeline shared by every data source.

use super::FetchError;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Longest body excerpt kept in a [`FetchError::ContentType`].
pub const BODY_PREVIEW_CHARS: usize = 100;

/// HTTP client validating that responses are JSON before decoding them.
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    client: Client,
    timeout: Duration,
}

impl JsonFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    /// Create a fetcher around an existing client (for testing).
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let value = self.get_value(url).await?;
        serde_json::from_value(value).map_err(|e| FetchError::MalformedPayload {
            message: e.to_string(),
        })
    }

    /// GET `url` and return the JSON body.
    ///
    /// Checks run in order: transport, status, content type, JSON syntax,
    /// embedded `error` field.
    pub async fn get_value(&self, url: &str) -> Result<Value, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let start = Instant::now();
        let result = self.get_value_inner(url).await;
        record_outcome("GET", &result, start.elapsed());

        match &result {
            Ok(_) => tracing::debug!(url, "Fetch succeeded"),
            Err(e) => tracing::debug!(url, error_kind = e.kind(), error = %e, "Fetch failed"),
        }
        result
    }

    async fn get_value_inner(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::transport(&e, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match content_type {
            Some(ct) if ct.contains("application/json") => {}
            observed => {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::ContentType {
                    observed_type: observed.unwrap_or_else(|| "unknown".to_string()),
                    body_preview: body.chars().take(BODY_PREVIEW_CHARS).collect(),
                });
            }
        }

        let value = read_json(response, self.timeout.as_secs()).await?;
        if let Some(message) = embedded_error(&value) {
            return Err(FetchError::Api { message });
        }
        Ok(value)
    }

    /// POST `body` as JSON to `url`, only checking that the call succeeded.
    ///
    /// Failure bodies carrying an `error` field become [`FetchError::Api`];
    /// anything else non-2xx becomes [`FetchError::Http`].
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<(), FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let start = Instant::now();
        let result = self.post_json_inner(url, body).await;
        record_outcome("POST", &result, start.elapsed());
        result
    }

    async fn post_json_inner(&self, url: &str, body: &Value) -> Result<(), FetchError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::transport(&e, self.timeout.as_secs()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(embedded_error);
        match message {
            Some(message) => Err(FetchError::Api { message }),
            None => Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            }),
        }
    }
}

async fn read_json(response: Response, timeout_seconds: u64) -> Result<Value, FetchError> {
    let text = response
        .text()
        .await
        .map_err(|e| FetchError::transport(&e, timeout_seconds))?;
    serde_json::from_str(&text).map_err(|e| FetchError::MalformedPayload {
        message: e.to_string(),
    })
}

/// The payload's own `error` field, when it holds something truthy.
fn embedded_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn record_outcome<T>(method: &'static str, result: &Result<T, FetchError>, elapsed: Duration) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::counter!("llmswitch_fetch_total", "method" => method, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("llmswitch_fetch_duration_seconds", "method" => method)
        .record(elapsed.as_secs_f64());
}
