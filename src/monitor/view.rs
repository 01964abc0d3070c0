//! Published view state

use super::CycleSequence;
use crate::render::DisplayModel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::watch;

/// What a monitor currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub display: DisplayModel,
    /// Cycle that produced this state, 0 for the initial placeholder
    pub sequence: u64,
    /// When the data behind the display was fetched
    pub last_updated: Option<DateTime<Utc>>,
}

/// Viewport, cycle numbering and output channel shared by both monitors.
#[derive(Debug)]
pub(crate) struct ViewChannel {
    name: &'static str,
    width: AtomicU32,
    sequence: CycleSequence,
    sender: watch::Sender<ViewState>,
}

impl ViewChannel {
    pub(crate) fn new(name: &'static str, width: u32, initial: DisplayModel) -> Self {
        let (sender, _) = watch::channel(ViewState {
            display: initial,
            sequence: 0,
            last_updated: None,
        });
        Self {
            name,
            width: AtomicU32::new(width),
            sequence: CycleSequence::new(),
            sender,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    pub(crate) fn set_width(&self, width: u32) {
        self.width.store(width, Ordering::Relaxed);
    }

    pub(crate) fn begin(&self) -> u64 {
        self.sequence.begin()
    }

    /// Claim the view for cycle `seq`, logging when it was superseded.
    pub(crate) fn claim(&self, seq: u64) -> bool {
        let claimed = self.sequence.try_publish(seq);
        if !claimed {
            tracing::debug!(
                view = self.name,
                sequence = seq,
                latest = self.sequence.last_published(),
                "Discarding superseded cycle"
            );
        }
        claimed
    }

    /// Publish a freshly fetched display.
    ///
    /// The sequence check and the send happen under the channel lock, so a
    /// cycle older than the published state never replaces it. Returns
    /// whether the state was replaced.
    pub(crate) fn publish(
        &self,
        seq: u64,
        display: DisplayModel,
        fetched_at: DateTime<Utc>,
    ) -> bool {
        let published = self.sender.send_if_modified(|state| {
            if state.sequence >= seq {
                return false;
            }
            *state = ViewState {
                display,
                sequence: seq,
                last_updated: Some(fetched_at),
            };
            true
        });
        if !published {
            tracing::debug!(
                view = self.name,
                sequence = seq,
                "Superseded cycle lost the publish race"
            );
        }
        published
    }

    /// Replace only the display, keeping sequence and timestamp.
    pub(crate) fn rerender(&self, display: DisplayModel) {
        self.sender.send_modify(|state| state.display = display);
    }

    pub(crate) fn current(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }
}
