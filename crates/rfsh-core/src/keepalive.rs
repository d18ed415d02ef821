//! Keep-alive scheduling for the shared connection.
//!
//! A countdown timer tracks how long ago the connection last proved itself
//! alive. Every successful round-trip resets it to the full interval; a
//! background task ticks it down and, when it runs out, issues a liveness
//! probe so the server sees traffic at least once per interval of
//! foreground inactivity.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::client::FileClient;
use crate::constants::{KEEPALIVE_FULL_INTERVAL, KEEPALIVE_POLL_INTERVAL};
use crate::guard::SharedConnection;

/// Keep-alive intervals. The defaults match interactive use; tests shrink
/// them to the millisecond scale.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    /// Probe budget: a probe is sent after this much inactivity.
    pub full_interval: Duration,
    /// Scheduler tick.
    pub poll_interval: Duration,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            full_interval: KEEPALIVE_FULL_INTERVAL,
            poll_interval: KEEPALIVE_POLL_INTERVAL,
        }
    }
}

/// Shared countdown until the next probe is due.
///
/// Cloned handles share the same countdown; the connection guard resets it
/// after every successful round-trip, the scheduler ticks it down.
#[derive(Debug, Clone)]
pub struct KeepaliveTimer {
    time_left: Arc<Mutex<Duration>>,
    config: KeepaliveConfig,
}

impl KeepaliveTimer {
    pub fn new(config: KeepaliveConfig) -> Self {
        let time_left = Arc::new(Mutex::new(config.full_interval));
        Self { time_left, config }
    }

    /// Restart the countdown at the full interval.
    pub fn reset(&self) {
        *self.lock() = self.config.full_interval;
    }

    /// Remaining time until a probe becomes due.
    pub fn time_left(&self) -> Duration {
        *self.lock()
    }

    pub fn config(&self) -> &KeepaliveConfig {
        &self.config
    }

    /// Advance the countdown by one poll tick. Returns true when a probe
    /// is due, in which case the countdown restarts at the full interval
    /// so a failing probe is retried once per interval, not every tick.
    fn tick(&self) -> bool {
        let mut left = self.lock();
        if *left <= self.config.poll_interval {
            *left = self.config.full_interval;
            true
        } else {
            *left -= self.config.poll_interval;
            false
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Duration> {
        self.time_left.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the spawned keep-alive task.
///
/// Dropping the handle without calling [`stop`](Keepalive::stop) leaves the
/// task running; orderly shutdown stops it and waits for the loop to observe
/// the flag before the connection is torn down, so a probe can never race
/// the disconnect.
#[derive(Debug)]
pub struct Keepalive {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Keepalive {
    /// Spawn the background keep-alive loop on the current runtime.
    pub fn spawn<C>(guard: SharedConnection<C>) -> Self
    where
        C: FileClient + 'static,
    {
        let (shutdown, mut observed) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let timer = guard.timer().clone();
            let poll = timer.config().poll_interval;
            debug!(?poll, "keep-alive task started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(poll) => {}
                    changed = observed.changed() => {
                        // A dropped sender means the handle is gone; treat
                        // it like a shutdown signal.
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                if *observed.borrow() {
                    break;
                }
                if timer.tick() {
                    match guard.ping().await {
                        Ok(()) => trace!("keep-alive probe ok"),
                        // Not surfaced to the user; the next foreground
                        // command reports connectivity loss itself.
                        Err(e) => warn!(error = %e, "keep-alive probe failed"),
                    }
                }
            }
            debug!("keep-alive task stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal the loop to stop and wait until it has exited.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
