//! Cycle ordering

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Monotonic cycle numbering for one view.
///
/// Every cycle takes a number when it starts. A finished cycle may publish
/// only if no later-started cycle has published already, so a slow response
/// can never overwrite a newer one.
#[derive(Debug, Default)]
pub struct CycleSequence {
    started: AtomicU64,
    published: Mutex<u64>,
}

impl CycleSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next cycle. The first cycle is 1.
    pub fn begin(&self) -> u64 {
        self.started.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claim the view for cycle `seq`. False when the cycle is superseded.
    pub fn try_publish(&self, seq: u64) -> bool {
        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if seq > *published {
            *published = seq;
            true
        } else {
            false
        }
    }

    /// Number of the most recently published cycle, 0 before any.
    pub fn last_published(&self) -> u64 {
        *self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }
}
