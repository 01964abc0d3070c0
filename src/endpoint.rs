//! Endpoint normalization.
//!
//! Users type endpoints in whatever shape is handy (`localhost:11434`,
//! `/api/gpu-data`, `https://gpu.lan/api`). Everything handed to the fetcher
//! goes through [`normalize`] first.

/// Turn a user-entered endpoint into an absolute, schemed URL.
///
/// Rules, applied in order:
/// 1. an `http://` or `https://` prefix (any case) is returned unchanged;
/// 2. a leading `/` is resolved against `origin`;
/// 3. anything else gets an `http://` prefix.
///
/// Empty input yields an empty string, which callers treat as
/// "not configured".
///
/// ```
/// use llmswitch::endpoint::normalize;
///
/// assert_eq!(normalize("h:1/path", "http://localhost:8000"), "http://h:1/path");
/// assert_eq!(normalize("/api/gpu", "http://localhost:8000"), "http://localhost:8000/api/gpu");
/// assert_eq!(normalize("", "http://localhost:8000"), "");
/// ```
pub fn normalize(url: &str, origin: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if has_http_scheme(url) {
        return url.to_string();
    }
    if url.starts_with('/') {
        return format!("{}{}", origin.trim_end_matches('/'), url);
    }
    format!("http://{}", url)
}

/// Case-insensitive check for an `http://` or `https://` prefix.
pub fn has_http_scheme(url: &str) -> bool {
    let prefix_matches = |prefix: &str| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    prefix_matches("http://") || prefix_matches("https://")
}

/// Append an API path to a base URL without doubling the slash.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Whether `url` parses as an absolute `http`/`https` URL with a host.
pub fn is_valid_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://localhost:8000";

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize("", ORIGIN), "");
        assert_eq!(normalize("   ", ORIGIN), "");
    }

    #[test]
    fn test_normalize_keeps_schemed_urls() {
        assert_eq!(
            normalize("http://example.com/api", ORIGIN),
            "http://example.com/api"
        );
        assert_eq!(
            normalize("https://example.com:5000/api/gpu-data", ORIGIN),
            "https://example.com:5000/api/gpu-data"
        );
        assert_eq!(normalize("HTTP://Example.com", ORIGIN), "HTTP://Example.com");
    }

    #[test]
    fn test_normalize_host_port() {
        assert_eq!(
            normalize("192.168.1.100:5000/api", ORIGIN),
            "http://192.168.1.100:5000/api"
        );
        assert_eq!(normalize("example.com/api", ORIGIN), "http://example.com/api");
    }

    #[test]
    fn test_normalize_relative_path_uses_origin() {
        assert_eq!(
            normalize("/api/gpu-data", ORIGIN),
            "http://localhost:8000/api/gpu-data"
        );
        assert_eq!(
            normalize("/api/gpu-data", "http://localhost:8000/"),
            "http://localhost:8000/api/gpu-data"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  h:1  ", ORIGIN), "http://h:1");
    }

    #[test]
    fn test_has_http_scheme_short_input() {
        assert!(!has_http_scheme("http"));
        assert!(!has_http_scheme("ftp://host"));
        assert!(has_http_scheme("hTtPs://host"));
    }

    #[test]
    fn test_join_handles_slashes() {
        assert_eq!(
            join("http://localhost:11434", "/api/tags"),
            "http://localhost:11434/api/tags"
        );
        assert_eq!(
            join("http://localhost:11434/", "api/ps"),
            "http://localhost:11434/api/ps"
        );
    }

    #[test]
    fn test_is_valid_http_url() {
        assert!(is_valid_http_url("http://192.168.1.100:5000/api/gpu-data"));
        assert!(is_valid_http_url("https://example.com:5000/api/gpu-data"));
        assert!(!is_valid_http_url("not-a-url"));
        assert!(!is_valid_http_url("ftp://example.com"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_schemed_input_is_identity(
                rest in "[a-z0-9.:/_-]{0,40}",
                https in any::<bool>(),
            ) {
                let scheme = if https { "https" } else { "http" };
                let url = format!("{}://{}", scheme, rest);
                prop_assert_eq!(normalize(&url, ORIGIN), url);
            }

            #[test]
            fn prop_output_always_schemed_or_empty(input in "[ a-zA-Z0-9.:/_-]{0,40}") {
                let out = normalize(&input, ORIGIN);
                prop_assert!(out.is_empty() || has_http_scheme(&out));
                prop_assert_eq!(out.is_empty(), input.trim().is_empty());
            }

            #[test]
            fn prop_normalize_is_idempotent(input in "[a-zA-Z0-9.:/_-]{0,40}") {
                let once = normalize(&input, ORIGIN);
                prop_assert_eq!(normalize(&once, ORIGIN), once.clone());
            }
        }
    }
}
