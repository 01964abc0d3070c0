//! Capped, persisted debug log

use super::{DebugEntry, DebugLevel, DebugSurface, DebugView};
use crate::store::{keys, KeyValueStore};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Entries kept in memory by default.
pub const DEFAULT_RETENTION: usize = 1000;
/// Entries persisted across restarts by default.
pub const DEFAULT_PERSISTED: usize = 100;

/// Append-only event log shared by every monitor component.
///
/// Entries are kept newest-first. Every mutation rewrites the persisted
/// slice and re-renders the attached surface, if any. Nothing here returns
/// an error: persistence problems are reported through `tracing` only.
pub struct DebugSink {
    store: Arc<dyn KeyValueStore>,
    retention: usize,
    persisted: usize,
    entries: Mutex<VecDeque<DebugEntry>>,
    surface: Mutex<Option<Arc<dyn DebugSurface>>>,
}

impl DebugSink {
    /// Open the sink, loading previously persisted entries from `store`.
    pub fn open(store: Arc<dyn KeyValueStore>, retention: usize, persisted: usize) -> Self {
        let retention = retention.max(1);
        let persisted = persisted.min(retention);

        let mut entries: VecDeque<DebugEntry> = match store.get(keys::DEBUG_MESSAGES) {
            Some(raw) => match serde_json::from_str::<Vec<DebugEntry>>(&raw) {
                Ok(loaded) => loaded.into(),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load persisted debug messages");
                    VecDeque::new()
                }
            },
            None => VecDeque::new(),
        };
        entries.truncate(retention);

        Self {
            store,
            retention,
            persisted,
            entries: Mutex::new(entries),
            surface: Mutex::new(None),
        }
    }

    /// Open with the default retention sizes.
    pub fn with_defaults(store: Arc<dyn KeyValueStore>) -> Self {
        Self::open(store, DEFAULT_RETENTION, DEFAULT_PERSISTED)
    }

    /// Record an event.
    pub fn log(&self, level: DebugLevel, message: impl Into<String>, data: Option<Value>) {
        let entry = DebugEntry::new(level, message, data);
        mirror_to_tracing(&entry);

        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.push_front(entry);
            entries.truncate(self.retention);
            self.persist(&entries);
        }
        self.refresh_surface();
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(DebugLevel::Info, message, None);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(DebugLevel::Warning, message, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(DebugLevel::Error, message, None);
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<DebugEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries passing `filter`, newest first.
    pub fn filtered(&self, filter: super::LevelFilter) -> Vec<DebugEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| filter.allows(e.level))
            .cloned()
            .collect()
    }

    /// Drop every entry, in memory and persisted.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        if let Err(e) = self.store.remove(keys::DEBUG_MESSAGES) {
            tracing::warn!(error = %e, "Could not remove persisted debug messages");
        }
        self.refresh_surface();
    }

    /// The whole log as plain text, one block per entry, blank-line separated.
    pub fn export(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(DebugEntry::to_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Attach a display surface and render to it right away.
    pub fn attach_surface(&self, surface: Arc<dyn DebugSurface>) {
        *self.surface.lock().unwrap_or_else(PoisonError::into_inner) = Some(surface);
        self.refresh_surface();
    }

    pub fn detach_surface(&self) {
        self.surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Re-render the attached surface, e.g. after its filter changed.
    pub fn refresh_surface(&self) {
        let surface = self
            .surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(surface) = surface else {
            return;
        };

        let entries = self.filtered(surface.level_filter());
        let scroll_to_top = surface.auto_scroll() && !entries.is_empty();
        surface.render(DebugView {
            entries,
            scroll_to_top,
        });
    }

    fn persist(&self, entries: &VecDeque<DebugEntry>) {
        let slice: Vec<&DebugEntry> = entries.iter().take(self.persisted).collect();
        let result = serde_json::to_string(&slice)
            .map_err(crate::store::StoreError::from)
            .and_then(|json| self.store.set(keys::DEBUG_MESSAGES, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Could not save debug messages");
        }
    }
}

/// File name for an exported log, e.g. `debug-log-2024-05-01T12-30-00.txt`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("debug-log-{}.txt", now.format("%Y-%m-%dT%H-%M-%S"))
}

fn mirror_to_tracing(entry: &DebugEntry) {
    let data = entry.data.as_ref().map(|d| d.to_string());
    match entry.level {
        DebugLevel::Info => {
            tracing::info!(data = data.as_deref(), "{}", entry.message)
        }
        DebugLevel::Warning => {
            tracing::warn!(data = data.as_deref(), "{}", entry.message)
        }
        DebugLevel::Error => {
            tracing::error!(data = data.as_deref(), "{}", entry.message)
        }
    }
}
