//! Display surfaces for the debug log

use super::{DebugEntry, LevelFilter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

/// What a surface shows after each change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugView {
    /// Entries passing the filter, newest first
    pub entries: Vec<DebugEntry>,
    /// Jump back to the newest entry
    pub scroll_to_top: bool,
}

/// Something that displays the debug log.
pub trait DebugSurface: Send + Sync {
    /// Minimum level to show.
    fn level_filter(&self) -> LevelFilter {
        LevelFilter::All
    }

    /// Whether new entries should scroll the view back to the top.
    fn auto_scroll(&self) -> bool {
        true
    }

    fn render(&self, view: DebugView);
}

/// Surface publishing every render on a watch channel.
#[derive(Debug)]
pub struct ChannelSurface {
    filter: Mutex<LevelFilter>,
    auto_scroll: AtomicBool,
    sender: watch::Sender<DebugView>,
}

impl ChannelSurface {
    pub fn new(filter: LevelFilter) -> (Self, watch::Receiver<DebugView>) {
        let (sender, receiver) = watch::channel(DebugView::default());
        let surface = Self {
            filter: Mutex::new(filter),
            auto_scroll: AtomicBool::new(true),
            sender,
        };
        (surface, receiver)
    }

    /// Change the filter. Takes effect on the next render.
    pub fn set_filter(&self, filter: LevelFilter) {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner) = filter;
    }

    pub fn set_auto_scroll(&self, enabled: bool) {
        self.auto_scroll.store(enabled, Ordering::Relaxed);
    }
}

impl DebugSurface for ChannelSurface {
    fn level_filter(&self) -> LevelFilter {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn auto_scroll(&self) -> bool {
        self.auto_scroll.load(Ordering::Relaxed)
    }

    fn render(&self, view: DebugView) {
        self.sender.send_replace(view);
    }
}
