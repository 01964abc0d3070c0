//! Integration tests for the fetchers and monitors against mock HTTP servers.

mod common;

use common::{mock_gpu, mock_ollama, monitor_config, open_session, tags_body};
use llmswitch::config::{EndpointSource, GPU_PLACEHOLDER_URL};
use llmswitch::debug::{DebugLevel, LevelFilter};
use llmswitch::fetch::{FetchError, GpuClient, OllamaClient, UnloadMethod, BODY_PREVIEW_CHARS};
use llmswitch::render::{DisplayModel, NoticeKind, Status};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn error_count(session: &llmswitch::monitor::MonitorSession) -> usize {
    session
        .sink()
        .filtered(LevelFilter::AtLeast(DebugLevel::Error))
        .len()
}

#[tokio::test]
async fn test_server_default_resolves_model_endpoint() {
    let dashboard = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ollamaHost": "h", "ollamaPort": "1"})),
        )
        .mount(&dashboard)
        .await;

    let mut config = monitor_config("http://localhost:11434", GPU_PLACEHOLDER_URL);
    config.origin = dashboard.uri();
    config.fetch_server_defaults = true;

    let (session, _store) = open_session(config).await;

    assert_eq!(session.models().base_url(), "http://h:1");
    assert_eq!(
        session.models().endpoint().source,
        EndpointSource::ServerDefault
    );
    // No GPU pair in the legacy schema: the configured fallback stays.
    assert_eq!(
        session.gpu().endpoint().source,
        EndpointSource::HardDefault
    );
}

#[tokio::test]
async fn test_server_default_failure_falls_back() {
    let dashboard = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&dashboard)
        .await;

    let mut config = monitor_config("http://fallback:11434", GPU_PLACEHOLDER_URL);
    config.origin = dashboard.uri();
    config.fetch_server_defaults = true;

    let (session, _store) = open_session(config).await;

    assert_eq!(session.models().base_url(), "http://fallback:11434");
    assert!(session.server_defaults().is_none());
    let warnings = session
        .sink()
        .filtered(LevelFilter::AtLeast(DebugLevel::Warning));
    assert!(warnings[0].message.contains("Failed to load config"));
}

#[tokio::test]
async fn test_gpu_http_500_is_one_error_entry() {
    let gpu = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gpu-data"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&gpu)
        .await;

    let gpu_url = format!("{}/api/gpu-data", gpu.uri());
    let (session, _store) = open_session(monitor_config("", &gpu_url)).await;

    let before = error_count(&session);
    session.refresh_gpu().await;
    assert_eq!(error_count(&session), before + 1);

    let error = session.gpu().last_error().unwrap();
    assert!(matches!(error, FetchError::Http { status: 500, .. }));

    match session.gpu().view().display {
        DisplayModel::Notice(notice) => {
            assert_eq!(notice.kind, NoticeKind::Error);
            assert!(notice.title.contains("500"));
        }
        other => panic!("Expected error notice, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gpu_text_plain_is_content_type_failure() {
    let gpu = MockServer::start().await;
    let body = "<html>".to_string() + &"x".repeat(500);
    Mock::given(method("GET"))
        .and(path("/api/gpu-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string(body),
        )
        .mount(&gpu)
        .await;

    let client = GpuClient::new(common::fetcher());
    let result = client.fetch(&format!("{}/api/gpu-data", gpu.uri())).await;

    match result {
        Err(FetchError::ContentType {
            observed_type,
            body_preview,
        }) => {
            assert!(observed_type.contains("text/plain"));
            assert!(body_preview.chars().count() <= BODY_PREVIEW_CHARS);
            assert!(body_preview.starts_with("<html>"));
        }
        other => panic!("Expected ContentType failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ps_failure_shows_all_models_stopped() {
    let ollama = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tags_body(&["llama3", "mistral", "phi3"])),
        )
        .mount(&ollama)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ps"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ollama)
        .await;

    let (session, _store) = open_session(monitor_config(&ollama.uri(), GPU_PLACEHOLDER_URL)).await;
    session.refresh_models().await;

    let report = session.models().last_report().unwrap();
    assert_eq!(report.stopped_count(), 3);
    assert_eq!(report.running_count(), 0);
    assert!(report.ps_error.is_some());

    match session.models().view().display {
        DisplayModel::Tabular(sections) => {
            let rows = &sections[0].rows;
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|r| r.status == Status::Stopped));
        }
        other => panic!("Expected table, got {:?}", other),
    }
}

#[tokio::test]
async fn test_models_running_listed_first() {
    let ollama = mock_ollama(&["alpha", "beta", "gamma"], &["gamma"]).await;

    let client = OllamaClient::new(common::fetcher());
    let report = client.fetch_models(&ollama.uri()).await.unwrap();

    let names: Vec<_> = report.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["gamma", "alpha", "beta"]);
    assert!(report.items[0].running);
    assert_eq!(report.available_count, 3);
}

#[tokio::test]
async fn test_models_mobile_layout_uses_cards() {
    let ollama = mock_ollama(&["alpha"], &["alpha"]).await;
    let (session, _store) = open_session(monitor_config(&ollama.uri(), GPU_PLACEHOLDER_URL)).await;

    session.refresh_models().await;
    session.models().resize(common::MOBILE_WIDTH);

    match session.models().view().display {
        DisplayModel::Cards(cards) => {
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].title, "alpha");
        }
        other => panic!("Expected cards, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gpu_report_renders_processes_section() {
    let gpu = mock_gpu().await;
    let gpu_url = format!("{}/api/gpu-data", gpu.uri());
    let (session, _store) = open_session(monitor_config("", &gpu_url)).await;

    session.refresh_gpu().await;

    let report = session.gpu().last_report().unwrap();
    assert_eq!(report.gpus.len(), 1);
    assert_eq!(report.processes[0].pid, 4242);

    match session.gpu().view().display {
        DisplayModel::Tabular(sections) => {
            assert_eq!(sections.len(), 2);
            assert_eq!(sections[1].title.as_deref(), Some("GPU Processes"));
        }
        other => panic!("Expected table, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gpu_placeholder_is_not_fetched() {
    let (session, _store) = open_session(monitor_config("", GPU_PLACEHOLDER_URL)).await;

    session.refresh_gpu().await;

    assert_eq!(session.gpu().last_error(), Some(FetchError::NotConfigured));
    assert_eq!(
        session.gpu().view().display.notice_kind(),
        Some(NoticeKind::NotConfigured)
    );
    assert_eq!(error_count(&session), 0);
}

#[tokio::test]
async fn test_gpu_embedded_error_field() {
    let gpu = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gpu-data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "nvidia-smi not found"})),
        )
        .mount(&gpu)
        .await;

    let client = GpuClient::new(common::fetcher());
    let result = client.fetch(&format!("{}/api/gpu-data", gpu.uri())).await;
    assert_eq!(
        result,
        Err(FetchError::Api {
            message: "nvidia-smi not found".to_string()
        })
    );
}

#[tokio::test]
async fn test_unload_falls_back_to_generate_with_gpu_disabled() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"keep_alive": 0})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "busy"})))
        .expect(1)
        .mount(&ollama)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"options": {"num_gpu": 0}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .expect(1)
        .mount(&ollama)
        .await;

    let client = OllamaClient::new(common::fetcher());
    let method = client.unload_model(&ollama.uri(), "llama3").await.unwrap();
    assert_eq!(method, UnloadMethod::Fallback);
}

#[tokio::test]
async fn test_server_default_with_numeric_ports() {
    let dashboard = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ollamaHost": "h",
            "ollamaPort": 11434,
            "gpuApiHost": "g",
            "gpuApiPort": 5000
        })))
        .mount(&dashboard)
        .await;

    let mut config = monitor_config("http://fallback:11434", GPU_PLACEHOLDER_URL);
    config.origin = dashboard.uri();
    config.fetch_server_defaults = true;

    let (session, _store) = open_session(config).await;

    assert_eq!(session.models().base_url(), "http://h:11434");
    assert_eq!(session.gpu().url(), "http://g:5000/api/gpu-data");
    assert_eq!(
        session.models().endpoint().source,
        EndpointSource::ServerDefault
    );
}
