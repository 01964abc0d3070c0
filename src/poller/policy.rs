//! Refresh cadence

use crate::config::ConfigError;
use crate::store::keys;

/// Shortest accepted refresh interval, in seconds.
pub const MIN_INTERVAL_SECONDS: u32 = 5;
/// Longest accepted refresh interval, in seconds.
pub const MAX_INTERVAL_SECONDS: u32 = 300;
/// Interval used when nothing valid is configured.
pub const DEFAULT_INTERVAL_SECONDS: u32 = 30;

/// Check that `seconds` is a usable refresh interval.
///
/// Takes a signed value so raw user input (`-3`, `0`) is rejected with the
/// same error as an oversized one.
pub fn validate_interval(seconds: i64) -> Result<u32, ConfigError> {
    let range = i64::from(MIN_INTERVAL_SECONDS)..=i64::from(MAX_INTERVAL_SECONDS);
    if !range.contains(&seconds) {
        return Err(ConfigError::validation(
            keys::REFRESH_INTERVAL,
            format!(
                "{} is outside {}..={} seconds",
                seconds, MIN_INTERVAL_SECONDS, MAX_INTERVAL_SECONDS
            ),
        ));
    }
    // Range checked above
    Ok(seconds as u32)
}

/// Countdown state driven by the poller's one-second timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval_seconds: u32,
    remaining_seconds: u32,
}

impl RefreshPolicy {
    /// A policy with a full countdown. Fails for intervals outside the
    /// accepted range.
    pub fn new(interval_seconds: u32) -> Result<Self, ConfigError> {
        let interval_seconds = validate_interval(i64::from(interval_seconds))?;
        Ok(Self {
            interval_seconds,
            remaining_seconds: interval_seconds,
        })
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Advance one second. Returns true when the countdown expired, in which
    /// case it has already been restarted.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.remaining_seconds = self.interval_seconds;
            true
        } else {
            false
        }
    }

    /// Restart the countdown from the full interval.
    pub fn reset(&mut self) {
        self.remaining_seconds = self.interval_seconds;
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            remaining_seconds: DEFAULT_INTERVAL_SECONDS,
        }
    }
}
