//! Fetch failure taxonomy.

use thiserror::Error;

/// Why a fetch produced no usable payload.
///
/// None of these abort polling; the next scheduled tick is the only retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never reached a server (DNS, refused, timeout).
    #[error("Request failed: {message}")]
    Transport { message: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// A 2xx response that is not JSON.
    #[error("Expected JSON but got {observed_type} content. Response starts with: {body_preview}")]
    ContentType {
        observed_type: String,
        body_preview: String,
    },

    /// Well-formed JSON carrying its own `error` field.
    #[error("API returned error: {message}")]
    Api { message: String },

    /// JSON that does not have the expected shape.
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// No endpoint to fetch from.
    #[error("Endpoint not configured")]
    NotConfigured,
}

impl FetchError {
    /// Stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Http { .. } => "http",
            FetchError::ContentType { .. } => "content_type",
            FetchError::Api { .. } => "api",
            FetchError::MalformedPayload { .. } => "malformed_payload",
            FetchError::NotConfigured => "not_configured",
        }
    }

    /// One-line user-facing summary.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub(crate) fn transport(err: &reqwest::Error, timeout_seconds: u64) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out after {}s", timeout_seconds)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        FetchError::Transport { message }
    }
}
