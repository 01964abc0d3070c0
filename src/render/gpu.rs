//! GPU telemetry view rendering

use super::{
    format_number, strings, Card, DisplayModel, Layout, Notice, NoticeKind, Status, TableRow,
    TableSection,
};
use crate::fetch::{FetchError, GpuReport, GpuSample, ProcessSample};

/// Render the latest GPU sample for a viewport `width` pixels wide.
pub fn render_gpu(report: &GpuReport, width: u32) -> DisplayModel {
    if report.gpus.is_empty() {
        return DisplayModel::Notice(Notice {
            kind: NoticeKind::Empty,
            title: "No GPUs detected".to_string(),
            lines: Vec::new(),
        });
    }

    match Layout::for_width(width) {
        Layout::Tabular => {
            let mut sections = vec![TableSection {
                title: Some("GPUs".to_string()),
                headers: strings([
                    "Index",
                    "Name",
                    "Temperature",
                    "GPU Usage",
                    "Memory Usage",
                    "Memory",
                    "Power Draw",
                ]),
                rows: report.gpus.iter().map(gpu_row).collect(),
            }];
            if !report.processes.is_empty() {
                sections.push(TableSection {
                    title: Some("GPU Processes".to_string()),
                    headers: strings(["PID", "Process Name", "GPU", "Memory Usage"]),
                    rows: report.processes.iter().map(process_row).collect(),
                });
            }
            DisplayModel::Tabular(sections)
        }
        Layout::Cards => {
            let mut cards: Vec<Card> = report.gpus.iter().map(gpu_card).collect();
            if !report.processes.is_empty() {
                cards.push(Card {
                    title: "GPU Processes".to_string(),
                    badge: None,
                    status: Status::Neutral,
                    fields: report
                        .processes
                        .iter()
                        .flat_map(|p| {
                            [
                                (format!("PID {}", p.pid), p.process_name.clone()),
                                ("Memory".to_string(), used_memory(p)),
                            ]
                        })
                        .collect(),
                    action: None,
                });
            }
            DisplayModel::Cards(cards)
        }
    }
}

/// Notice shown when the telemetry fetch failed.
pub fn render_gpu_error(error: &FetchError, endpoint: &str) -> DisplayModel {
    if matches!(error, FetchError::NotConfigured) {
        return render_gpu_not_configured();
    }
    DisplayModel::Notice(Notice {
        kind: NoticeKind::Error,
        title: format!("Error connecting to GPU Monitoring API: {}", error.summary()),
        lines: vec![
            "Make sure your GPU monitoring service is running and the API URL is correct."
                .to_string(),
            format!("Current endpoint: {}", endpoint),
        ],
    })
}

/// Notice shown while the GPU endpoint is unset or still the placeholder.
pub fn render_gpu_not_configured() -> DisplayModel {
    DisplayModel::Notice(Notice {
        kind: NoticeKind::NotConfigured,
        title: "GPU monitoring is not configured".to_string(),
        lines: vec!["Set the GPU API endpoint with `llmswitch endpoint --gpu <URL>`.".to_string()],
    })
}

fn temperature(gpu: &GpuSample) -> String {
    format!("{}°C", format_number(gpu.temperature_c))
}

fn percent(value: f64) -> String {
    format!("{}%", format_number(value))
}

fn memory(gpu: &GpuSample) -> String {
    format!(
        "{} / {} MB",
        format_number(gpu.mem_used_mb),
        format_number(gpu.mem_total_mb)
    )
}

fn power(gpu: &GpuSample) -> String {
    format!("{} W", format_number(gpu.power_draw_w))
}

fn used_memory(process: &ProcessSample) -> String {
    process
        .used_memory
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn gpu_row(gpu: &GpuSample) -> TableRow {
    TableRow {
        cells: vec![
            gpu.index.to_string(),
            gpu.name.clone(),
            temperature(gpu),
            percent(gpu.gpu_util_pct),
            percent(gpu.mem_util_pct),
            memory(gpu),
            power(gpu),
        ],
        status: Status::Neutral,
        action: None,
    }
}

fn process_row(process: &ProcessSample) -> TableRow {
    TableRow {
        cells: vec![
            process.pid.to_string(),
            process.process_name.clone(),
            process.gpu_name.clone(),
            used_memory(process),
        ],
        status: Status::Neutral,
        action: None,
    }
}

fn gpu_card(gpu: &GpuSample) -> Card {
    Card {
        title: gpu.name.clone(),
        badge: Some(format!("GPU {}", gpu.index)),
        status: Status::Running,
        fields: vec![
            ("Temperature".to_string(), temperature(gpu)),
            ("GPU Usage".to_string(), percent(gpu.gpu_util_pct)),
            ("Memory Usage".to_string(), percent(gpu.mem_util_pct)),
            ("Memory".to_string(), memory(gpu)),
            ("Power Draw".to_string(), power(gpu)),
        ],
        action: None,
    }
}
