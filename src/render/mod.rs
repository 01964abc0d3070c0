//! Pure view rendering.
//!
//! Maps fetched view models (or failures) to a [`DisplayModel`]: a table
//! layout for wide viewports, cards for narrow ones, or a notice. Nothing
//! here touches the network, the store, or a terminal; adapters bind the
//! display model to an actual UI.

mod format;
mod gpu;
mod models;

pub use format::{format_number, format_run_time, format_size};
pub use gpu::{render_gpu, render_gpu_error, render_gpu_not_configured};
pub use models::{render_model_error, render_models};

use serde::Serialize;

/// Viewports narrower than this many logical pixels get the card layout.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Layout strategy for a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Tabular,
    Cards,
}

impl Layout {
    pub fn for_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            Layout::Cards
        } else {
            Layout::Tabular
        }
    }
}

/// User action attached to a model row or card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "model", rename_all = "snake_case")]
pub enum Action {
    Stop(String),
    Load(String),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Stop(_) => "Stop",
            Action::Load(_) => "Load",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Action::Stop(model) | Action::Load(model) => model,
        }
    }
}

/// Visual state of a row or card, used by adapters for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Stopped,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub status: Status,
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSection {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub badge: Option<String>,
    pub status: Status,
    pub fields: Vec<(String, String)>,
    pub action: Option<Action>,
}

/// Why a notice replaced the data view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// No cycle has finished yet
    Loading,
    /// The source answered but had nothing to show
    Empty,
    /// The source could not be read
    Error,
    /// No usable endpoint
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub lines: Vec<String>,
}

/// Renderer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", content = "content", rename_all = "snake_case")]
pub enum DisplayModel {
    Tabular(Vec<TableSection>),
    Cards(Vec<Card>),
    Notice(Notice),
}

impl DisplayModel {
    /// Every action offered by the display, in order.
    pub fn actions(&self) -> Vec<&Action> {
        match self {
            DisplayModel::Tabular(sections) => sections
                .iter()
                .flat_map(|s| s.rows.iter())
                .filter_map(|r| r.action.as_ref())
                .collect(),
            DisplayModel::Cards(cards) => {
                cards.iter().filter_map(|c| c.action.as_ref()).collect()
            }
            DisplayModel::Notice(_) => Vec::new(),
        }
    }

    pub fn notice_kind(&self) -> Option<NoticeKind> {
        match self {
            DisplayModel::Notice(notice) => Some(notice.kind),
            _ => None,
        }
    }
}

/// Placeholder shown until the first cycle of a view completes.
pub fn render_loading(what: &str) -> DisplayModel {
    DisplayModel::Notice(Notice {
        kind: NoticeKind::Loading,
        title: format!("Loading {}...", what),
        lines: Vec::new(),
    })
}

fn strings<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
