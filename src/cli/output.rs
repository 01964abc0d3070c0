//! Output formatting helpers for CLI commands
//!
//! Binds the renderer's [`DisplayModel`] to a terminal: tables through
//! comfy-table, cards as indented blocks, notices as colored text.

use crate::config::EndpointSource;
use crate::debug::{DebugEntry, DebugLevel};
use crate::fetch::{GpuReport, ModelReport};
use crate::monitor::ViewState;
use crate::render::{Card, DisplayModel, Notice, NoticeKind, Status, TableSection};
use chrono::Local;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for endpoint display
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointView {
    pub view: String,
    /// Value as entered or defaulted
    pub configured: String,
    /// Absolute URL actually fetched, empty when unusable
    pub resolved: String,
    pub source: EndpointSource,
    /// Outcome of the latest cycle, `None` when the view was not fetched
    pub status: Option<String>,
}

impl EndpointView {
    /// Short status label for a published view.
    pub fn status_label(view: &ViewState) -> Option<String> {
        if view.sequence == 0 {
            return None;
        }
        let label = match view.display.notice_kind() {
            None => "OK",
            Some(NoticeKind::Loading) => "Loading",
            Some(NoticeKind::Empty) => "Empty",
            Some(NoticeKind::Error) => "Error",
            Some(NoticeKind::NotConfigured) => "Not configured",
        };
        Some(label.to_string())
    }
}

/// Format endpoints as a table
pub fn format_endpoints_table(endpoints: &[EndpointView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["View", "Endpoint", "Resolved", "Source", "Status"]);

    for e in endpoints {
        let source = match e.source {
            EndpointSource::Stored => "Saved".green().to_string(),
            EndpointSource::ServerDefault => "Server".cyan().to_string(),
            EndpointSource::HardDefault => "Default".yellow().to_string(),
        };
        let status = match e.status.as_deref() {
            Some("OK") => "OK".green().to_string(),
            Some(other @ ("Error" | "Not configured")) => other.red().to_string(),
            Some(other) => other.yellow().to_string(),
            None => "-".to_string(),
        };
        let resolved = if e.resolved.is_empty() {
            "(not configured)".to_string()
        } else {
            e.resolved.clone()
        };

        table.add_row(vec![
            Cell::new(&e.view),
            Cell::new(&e.configured),
            Cell::new(resolved),
            Cell::new(source),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

/// Format endpoints as JSON
pub fn format_endpoints_json(endpoints: &[EndpointView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "endpoints": endpoints
    }))
}

/// Format a display model for the terminal
pub fn format_display(display: &DisplayModel) -> String {
    match display {
        DisplayModel::Tabular(sections) => sections
            .iter()
            .map(format_section)
            .collect::<Vec<_>>()
            .join("\n\n"),
        DisplayModel::Cards(cards) => cards
            .iter()
            .map(format_card)
            .collect::<Vec<_>>()
            .join("\n\n"),
        DisplayModel::Notice(notice) => format_notice(notice),
    }
}

fn format_section(section: &TableSection) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(section.headers.clone());

    for row in &section.rows {
        let mut cells: Vec<Cell> = Vec::with_capacity(row.cells.len());
        for (i, text) in row.cells.iter().enumerate() {
            // The first column carries the row status.
            if i == 0 {
                cells.push(Cell::new(colorize_status(text, row.status)));
            } else {
                cells.push(Cell::new(text));
            }
        }
        table.add_row(cells);
    }

    match &section.title {
        Some(title) => format!("{}\n{}", title.bold(), table),
        None => table.to_string(),
    }
}

fn format_card(card: &Card) -> String {
    let mut header = colorize_status(&card.title, card.status).bold().to_string();
    if let Some(badge) = &card.badge {
        header.push_str(&format!(" [{}]", badge));
    }

    let mut lines = vec![header];
    for (label, value) in &card.fields {
        lines.push(format!("  {}: {}", label.dimmed(), value));
    }
    if let Some(action) = &card.action {
        lines.push(format!("  → {} ({})", action.label(), action.model()));
    }
    lines.join("\n")
}

fn format_notice(notice: &Notice) -> String {
    let title = match notice.kind {
        NoticeKind::Loading => notice.title.cyan().to_string(),
        NoticeKind::Empty => notice.title.yellow().to_string(),
        NoticeKind::Error => notice.title.red().to_string(),
        NoticeKind::NotConfigured => notice.title.yellow().to_string(),
    };

    let mut lines = vec![title];
    lines.extend(notice.lines.iter().map(|line| format!("  • {}", line)));
    lines.join("\n")
}

fn colorize_status(text: &str, status: Status) -> String {
    match status {
        Status::Running => text.green().to_string(),
        Status::Stopped => text.red().to_string(),
        Status::Neutral => text.to_string(),
    }
}

/// Format a titled view with its last update time
pub fn format_view(title: &str, view: &ViewState) -> String {
    let updated = match view.last_updated {
        Some(at) => format!(
            "Last updated: {}",
            at.with_timezone(&Local).format("%H:%M:%S")
        ),
        None => "Not updated yet".to_string(),
    };
    format!(
        "{}  {}\n{}",
        title.bold().underline(),
        updated.dimmed(),
        format_display(&view.display)
    )
}

/// Countdown line shown above the views
pub fn format_countdown(remaining_seconds: u32) -> String {
    format!("Next refresh in {}s", remaining_seconds)
}

/// Format debug entries as colored text blocks, newest first
pub fn format_debug_entries(entries: &[DebugEntry]) -> String {
    if entries.is_empty() {
        return "No debug messages".dimmed().to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let text = entry.to_text();
            match entry.level {
                DebugLevel::Info => text,
                DebugLevel::Warning => text.yellow().to_string(),
                DebugLevel::Error => text.red().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format debug entries as JSON
pub fn format_debug_json(entries: &[DebugEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "entries": entries
    }))
}

/// Format a model report as JSON
pub fn format_models_json(
    report: &ModelReport,
    base_url: &str,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "baseUrl": base_url,
        "fetchedAt": report.fetched_at,
        "available": report.available_count,
        "running": report.running_count(),
        "models": report.items,
        "tagsError": report.tags_error.as_ref().map(ToString::to_string),
        "psError": report.ps_error.as_ref().map(ToString::to_string),
    }))
}

/// Format a GPU report as JSON
pub fn format_gpu_json(report: &GpuReport, endpoint: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "endpoint": endpoint,
        "fetchedAt": report.fetched_at,
        "gpus": report.gpus,
        "processes": report.processes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RuntimeItem;
    use crate::render::{Action, TableRow};
    use chrono::Utc;

    fn no_color() {
        colored::control::set_override(false);
    }

    fn section() -> TableSection {
        TableSection {
            title: Some("GPUs".to_string()),
            headers: vec!["Index".to_string(), "Name".to_string()],
            rows: vec![TableRow {
                cells: vec!["0".to_string(), "RTX 4090".to_string()],
                status: Status::Neutral,
                action: None,
            }],
        }
    }

    #[test]
    fn test_format_tabular_includes_title_and_cells() {
        no_color();
        let output = format_display(&DisplayModel::Tabular(vec![section()]));
        assert!(output.starts_with("GPUs\n"));
        assert!(output.contains("Index"));
        assert!(output.contains("RTX 4090"));
    }

    #[test]
    fn test_format_card_fields_and_action() {
        no_color();
        let card = Card {
            title: "llama3".to_string(),
            badge: Some("Running".to_string()),
            status: Status::Running,
            fields: vec![("Size".to_string(), "4.7 GB".to_string())],
            action: Some(Action::Stop("llama3".to_string())),
        };
        let output = format_display(&DisplayModel::Cards(vec![card]));
        assert!(output.starts_with("llama3 [Running]"));
        assert!(output.contains("  Size: 4.7 GB"));
        assert!(output.contains("Stop (llama3)"));
    }

    #[test]
    fn test_format_notice_lines() {
        no_color();
        let notice = Notice {
            kind: NoticeKind::Error,
            title: "Error connecting".to_string(),
            lines: vec!["Current API URL: http://h:1".to_string()],
        };
        let output = format_display(&DisplayModel::Notice(notice));
        assert_eq!(output, "Error connecting\n  • Current API URL: http://h:1");
    }

    #[test]
    fn test_format_view_not_updated() {
        no_color();
        let view = ViewState {
            display: crate::render::render_loading("models"),
            sequence: 0,
            last_updated: None,
        };
        let output = format_view("Models", &view);
        assert!(output.contains("Not updated yet"));
        assert!(output.contains("Loading models..."));
    }

    #[test]
    fn test_format_endpoints_table() {
        no_color();
        let endpoints = vec![EndpointView {
            view: "GPU".to_string(),
            configured: "http://your-server-ip:5000/api/gpu-data".to_string(),
            resolved: String::new(),
            source: EndpointSource::HardDefault,
            status: None,
        }];
        let output = format_endpoints_table(&endpoints);
        assert!(output.contains("Resolved"));
        assert!(output.contains("(not configured)"));
        assert!(output.contains("Default"));
    }

    #[test]
    fn test_endpoint_status_label() {
        let mut view = ViewState {
            display: crate::render::render_loading("models"),
            sequence: 0,
            last_updated: None,
        };
        assert_eq!(EndpointView::status_label(&view), None);

        view.sequence = 1;
        view.display = crate::render::render_gpu_not_configured();
        assert_eq!(
            EndpointView::status_label(&view).as_deref(),
            Some("Not configured")
        );
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(12), "Next refresh in 12s");
    }

    #[test]
    fn test_format_debug_entries_empty() {
        no_color();
        assert_eq!(format_debug_entries(&[]), "No debug messages");
    }

    #[test]
    fn test_format_debug_json_valid() {
        let entries = vec![DebugEntry::new(DebugLevel::Warning, "careful", None)];
        let output = format_debug_json(&entries).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["entries"][0]["level"], "warning");
        assert_eq!(parsed["entries"][0]["message"], "careful");
    }

    #[test]
    fn test_format_models_json_counts() {
        let report = ModelReport {
            items: vec![RuntimeItem {
                name: "llama3".to_string(),
                id: "abc".to_string(),
                started_at: None,
                size_bytes: 0,
                param_size: "8B".to_string(),
                quantization: None,
                running: false,
            }],
            available_count: 1,
            tags_error: None,
            ps_error: Some(crate::fetch::FetchError::NotConfigured),
            fetched_at: Utc::now(),
        };
        let output = format_models_json(&report, "http://h:1").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["available"], 1);
        assert_eq!(parsed["running"], 0);
        assert_eq!(parsed["models"][0]["name"], "llama3");
        assert!(parsed["tagsError"].is_null());
        assert!(parsed["psError"].is_string());
    }
}
