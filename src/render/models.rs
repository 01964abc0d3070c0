//! Model-runtime view rendering

use super::{
    format_run_time, format_size, strings, Action, Card, DisplayModel, Layout, Notice,
    NoticeKind, Status, TableRow, TableSection,
};
use crate::fetch::{FetchError, ModelReport, RuntimeItem};
use chrono::{DateTime, Utc};

const ID_PREFIX_CHARS: usize = 12;

/// Render a model report for a viewport `width` pixels wide.
///
/// An empty report becomes a "nothing found" notice, never an error.
pub fn render_models(
    report: &ModelReport,
    width: u32,
    now: DateTime<Utc>,
    base_url: &str,
) -> DisplayModel {
    if report.is_empty() {
        return DisplayModel::Notice(Notice {
            kind: NoticeKind::Empty,
            title: "No models found. This could mean:".to_string(),
            lines: vec![
                "Ollama is not running".to_string(),
                "No models are installed (try: ollama pull llama2)".to_string(),
                format!("API URL is incorrect: {}", base_url),
            ],
        });
    }

    match Layout::for_width(width) {
        Layout::Tabular => DisplayModel::Tabular(vec![TableSection {
            title: None,
            headers: strings([
                "Status",
                "Model",
                "ID",
                "Running since",
                "Size",
                "Parameters",
                "Actions",
            ]),
            rows: report.items.iter().map(|item| row(item, now)).collect(),
        }]),
        Layout::Cards => {
            DisplayModel::Cards(report.items.iter().map(|item| card(item, now)).collect())
        }
    }
}

/// Notice shown when the model view could not be fetched at all.
pub fn render_model_error(error: &FetchError, base_url: &str) -> DisplayModel {
    if matches!(error, FetchError::NotConfigured) {
        return DisplayModel::Notice(Notice {
            kind: NoticeKind::NotConfigured,
            title: "Ollama API URL is not configured".to_string(),
            lines: vec!["Set one with `llmswitch endpoint --models <URL>`.".to_string()],
        });
    }
    DisplayModel::Notice(Notice {
        kind: NoticeKind::Error,
        title: "Error connecting to Ollama API. Make sure Ollama is running and the API URL is correct."
            .to_string(),
        lines: vec![
            format!("Error: {}", error.summary()),
            format!("Current API URL: {}", base_url),
        ],
    })
}

fn display_name(item: &RuntimeItem) -> String {
    if item.name.is_empty() {
        "(unnamed)".to_string()
    } else {
        item.name.clone()
    }
}

fn short_id(item: &RuntimeItem) -> String {
    if item.id.is_empty() {
        "N/A".to_string()
    } else {
        item.id.chars().take(ID_PREFIX_CHARS).collect()
    }
}

fn parameters(item: &RuntimeItem) -> String {
    match &item.quantization {
        Some(quant) => format!("{} ({})", item.param_size, quant),
        None => item.param_size.clone(),
    }
}

fn action(item: &RuntimeItem) -> Action {
    if item.running {
        Action::Stop(item.name.clone())
    } else {
        Action::Load(item.name.clone())
    }
}

fn row(item: &RuntimeItem, now: DateTime<Utc>) -> TableRow {
    let cells = if item.running {
        vec![
            "Running".to_string(),
            display_name(item),
            short_id(item),
            format_run_time(item.started_at, now),
            format_size(item.size_bytes),
            parameters(item),
            "Stop".to_string(),
        ]
    } else {
        vec![
            "Stopped".to_string(),
            display_name(item),
            "-".to_string(),
            "-".to_string(),
            format_size(item.size_bytes),
            "-".to_string(),
            "Load".to_string(),
        ]
    };
    TableRow {
        cells,
        status: if item.running {
            Status::Running
        } else {
            Status::Stopped
        },
        action: Some(action(item)),
    }
}

fn card(item: &RuntimeItem, now: DateTime<Utc>) -> Card {
    if item.running {
        Card {
            title: display_name(item),
            badge: Some("Running".to_string()),
            status: Status::Running,
            fields: vec![
                ("ID".to_string(), short_id(item)),
                (
                    "Running since".to_string(),
                    format_run_time(item.started_at, now),
                ),
                ("Size".to_string(), format_size(item.size_bytes)),
                ("Parameters".to_string(), parameters(item)),
            ],
            action: Some(action(item)),
        }
    } else {
        Card {
            title: display_name(item),
            badge: Some("Stopped".to_string()),
            status: Status::Stopped,
            fields: vec![("Size".to_string(), format_size(item.size_bytes))],
            action: Some(action(item)),
        }
    }
}
