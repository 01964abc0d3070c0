//! Debug log entries and level filtering

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Severity of a debug entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    Warning,
    Error,
    /// Unrecognized persisted levels are read as info
    #[serde(other)]
    Info,
}

impl DebugLevel {
    /// Filtering priority: error 3, warning 2, info 1.
    pub fn priority(self) -> u8 {
        match self {
            DebugLevel::Info => 1,
            DebugLevel::Warning => 2,
            DebugLevel::Error => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DebugLevel::Info => "info",
            DebugLevel::Warning => "warning",
            DebugLevel::Error => "error",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(DebugLevel::Info),
            "warning" | "warn" => Ok(DebugLevel::Warning),
            "error" => Ok(DebugLevel::Error),
            _ => Err(format!("Unknown debug level: {}", s)),
        }
    }
}

/// Minimum level shown on a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    AtLeast(DebugLevel),
}

impl LevelFilter {
    pub fn allows(self, level: DebugLevel) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::AtLeast(min) => level.priority() >= min.priority(),
        }
    }
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(LevelFilter::All);
        }
        s.parse().map(LevelFilter::AtLeast)
    }
}

/// One event in the debug log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: DebugLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl DebugEntry {
    pub fn new(level: DebugLevel, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: data.filter(|d| !d.is_null()),
        }
    }

    /// Plain-text block: `[time] [LEVEL] message`, then the data.
    ///
    /// Object and array data is pretty-printed on the following lines;
    /// scalar data follows the message on the same line.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "[{}] [{}] {}",
            self.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            self.level.as_str().to_uppercase(),
            self.message
        );
        match &self.data {
            None => {}
            Some(Value::String(s)) => {
                text.push(' ');
                text.push_str(s);
            }
            Some(data @ (Value::Object(_) | Value::Array(_))) => {
                text.push('\n');
                text.push_str(
                    &serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()),
                );
            }
            Some(other) => {
                text.push(' ');
                text.push_str(&other.to_string());
            }
        }
        text
    }
}
