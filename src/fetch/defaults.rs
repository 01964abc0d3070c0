//! One-shot lookup of the dashboard server's endpoint defaults.

use super::{FetchError, JsonFetcher};
use crate::config::ServerDefaults;
use crate::endpoint;

/// Path of the defaults endpoint on the dashboard server.
pub const CONFIG_PATH: &str = "/api/config";

/// GET `{origin}/api/config`.
pub async fn fetch_server_defaults(
    fetcher: &JsonFetcher,
    origin: &str,
) -> Result<ServerDefaults, FetchError> {
    if origin.trim().is_empty() {
        return Err(FetchError::NotConfigured);
    }
    fetcher
        .get_json(&endpoint::join(origin, CONFIG_PATH))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_server_defaults() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ollamaHost":"h","ollamaPort":"1"}"#)
            .create_async()
            .await;

        let fetcher = JsonFetcher::new(Duration::from_secs(5)).unwrap();
        let defaults = fetch_server_defaults(&fetcher, &server.url()).await.unwrap();
        assert_eq!(defaults.ollama_url(), "http://h:1");
    }

    #[tokio::test]
    async fn test_fetch_server_defaults_missing_fields() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected":true}"#)
            .create_async()
            .await;

        let fetcher = JsonFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetch_server_defaults(&fetcher, &server.url()).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload { .. }));
    }
}
