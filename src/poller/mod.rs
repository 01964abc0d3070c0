//! Periodic refresh scheduling.
//!
//! A [`Poller`] owns one cancellable one-second timer task. Every tick
//! advances its [`RefreshPolicy`]; when the countdown expires the poller
//! spawns one run of its [`RefreshCycle`]. Each run is its own task, so a
//! slow or panicking cycle never stalls the timer.

mod policy;

pub use policy::{
    validate_interval, RefreshPolicy, DEFAULT_INTERVAL_SECONDS, MAX_INTERVAL_SECONDS,
    MIN_INTERVAL_SECONDS,
};

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// One fetch-and-render pass, triggered by the poller.
#[async_trait]
pub trait RefreshCycle: Send + Sync + 'static {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Run one cycle. Must handle its own failures.
    async fn run_cycle(&self);
}

/// Whether the poller currently owns a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Running,
}

struct Timer {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Countdown timer driving one view.
pub struct Poller {
    cycle: Arc<dyn RefreshCycle>,
    policy: Arc<Mutex<RefreshPolicy>>,
    countdown: watch::Sender<u32>,
    timer: Mutex<Option<Timer>>,
}

impl Poller {
    /// Create an idle poller.
    pub fn new(cycle: Arc<dyn RefreshCycle>, policy: RefreshPolicy) -> Self {
        let (countdown, _) = watch::channel(policy.remaining_seconds());
        Self {
            cycle,
            policy: Arc::new(Mutex::new(policy)),
            countdown,
            timer: Mutex::new(None),
        }
    }

    /// Install `policy` and start a fresh timer, cancelling any existing one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, policy: RefreshPolicy) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = timer.take() {
            old.cancel_token.cancel();
        }

        self.set_policy(policy);

        let cancel_token = CancellationToken::new();
        let handle = self.spawn_timer(cancel_token.clone());
        *timer = Some(Timer {
            cancel_token,
            handle,
        });

        tracing::debug!(
            poller = self.cycle.name(),
            interval_seconds = policy.interval_seconds(),
            "Poller started"
        );
    }

    /// Cancel the timer, apply `policy` and start again. Used for manual
    /// refreshes and interval changes.
    pub fn reset(&self, policy: RefreshPolicy) {
        self.start(policy);
    }

    /// Replace the policy without touching the timer state. An idle poller
    /// stays idle.
    pub fn set_policy(&self, policy: RefreshPolicy) {
        let remaining = {
            let mut current = self.policy.lock().unwrap_or_else(PoisonError::into_inner);
            *current = policy;
            current.reset();
            current.remaining_seconds()
        };
        self.countdown.send_replace(remaining);
    }

    /// Restart the countdown with the current interval.
    pub fn restart(&self) {
        let policy = self.policy();
        self.start(policy);
    }

    /// Cancel the timer. No further cycles are triggered; a cycle already in
    /// flight runs to completion.
    pub fn stop(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.cancel_token.cancel();
            tracing::debug!(poller = self.cycle.name(), "Poller stopped");
        }
    }

    /// Stop and wait for the timer task to exit.
    pub async fn shutdown(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.cancel_token.cancel();
            let _ = timer.handle.await;
        }
    }

    pub fn state(&self) -> PollerState {
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        match timer.as_ref() {
            Some(t) if !t.handle.is_finished() => PollerState::Running,
            _ => PollerState::Idle,
        }
    }

    /// Snapshot of the current policy.
    pub fn policy(&self) -> RefreshPolicy {
        *self.policy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Observe the seconds left until the next automatic cycle.
    pub fn subscribe_countdown(&self) -> watch::Receiver<u32> {
        self.countdown.subscribe()
    }

    fn spawn_timer(&self, cancel_token: CancellationToken) -> JoinHandle<()> {
        let cycle = Arc::clone(&self.cycle);
        let policy = Arc::clone(&self.policy);
        let countdown = self.countdown.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let (expired, remaining) = {
                            let mut policy = policy.lock().unwrap_or_else(PoisonError::into_inner);
                            let expired = policy.tick();
                            (expired, policy.remaining_seconds())
                        };
                        countdown.send_replace(remaining);

                        if expired {
                            tracing::debug!(poller = cycle.name(), "Countdown expired");
                            let cycle = Arc::clone(&cycle);
                            tokio::spawn(async move {
                                cycle.run_cycle().await;
                            });
                        }
                    }
                }
            }
        })
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
