//! Background rechecks on a fixed interval.
//!
//! The recheck loop runs on its own named thread for the life of the
//! process. Ticks are strictly sequential: the wait for the next tick starts
//! only after the current evaluation returns, so a slow lookup delays the
//! schedule instead of overlapping with it.

use crate::identity::LocalIdentity;
use crate::notifier::Notifier;
use crate::state::StatusReader;
use crate::validator::Validator;
use crate::LicenseGuardError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Name of the background thread.
pub const RECHECK_THREAD_NAME: &str = "license-recheck";

/// Cooperative stop signal for the recheck loop.
///
/// Clones share the same signal. Nothing cancels it unless the host asks.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake any waiter.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`. Returns `true` as soon as the token is
    /// cancelled, `false` if the full timeout elapsed.
    ///
    /// A timeout too large to express as a deadline waits until cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            cancelled = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    cvar.wait_timeout(cancelled, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => cvar.wait(cancelled).unwrap_or_else(PoisonError::into_inner),
            };
        }
        true
    }
}

/// Drives a [`Validator`] on a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct RecheckScheduler {
    interval: Duration,
}

impl RecheckScheduler {
    /// Scheduler ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the recheck loop.
    ///
    /// The first tick happens one interval from now. Every tick evaluates
    /// `identity` and, when the outcome is invalid, invokes the notifier's
    /// failure callback. The loop only ends when `token` is cancelled.
    ///
    /// # Errors
    /// `SchedulerSpawn` if the thread cannot be created.
    pub fn start(
        &self,
        validator: Validator,
        identity: LocalIdentity,
        notifier: Notifier,
        token: CancellationToken,
    ) -> Result<RecheckHandle, LicenseGuardError> {
        let status = validator.subscribe();
        let interval = self.interval;
        let loop_token = token.clone();

        let thread = thread::Builder::new()
            .name(RECHECK_THREAD_NAME.to_string())
            .spawn(move || run_loop(validator, identity, notifier, interval, loop_token))
            .map_err(|e| LicenseGuardError::SchedulerSpawn(e.to_string()))?;

        debug!(interval_secs = interval.as_secs(), "License recheck loop started");

        Ok(RecheckHandle {
            token,
            thread: Some(thread),
            status,
        })
    }
}

fn run_loop(
    validator: Validator,
    identity: LocalIdentity,
    notifier: Notifier,
    interval: Duration,
    token: CancellationToken,
) {
    let mut tick: u64 = 0;
    while !token.wait_timeout(interval) {
        tick += 1;
        debug!(tick, "License recheck tick");
        // A panicking source or callback costs one tick, never the loop.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let evaluation = validator.evaluate(&identity);
            notifier.notify_tick(evaluation.outcome);
        }));
        if let Err(payload) = result {
            error!(
                tick,
                panic = panic_message(payload.as_ref()),
                "License recheck tick panicked"
            );
        }
    }
    debug!(ticks = tick, "License recheck loop cancelled");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Handle to a running recheck loop.
///
/// Dropping the handle leaves the loop running.
#[derive(Debug)]
pub struct RecheckHandle {
    token: CancellationToken,
    thread: Option<JoinHandle<()>>,
    status: StatusReader,
}

impl RecheckHandle {
    /// Observe the status the loop publishes.
    pub fn status(&self) -> StatusReader {
        self.status.clone()
    }

    /// Ask the loop to stop. It exits before its next evaluation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called on this loop's token.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The loop's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the loop and wait for its thread to exit.
    ///
    /// Returns `false` if the thread panicked.
    pub fn stop(mut self) -> bool {
        self.token.cancel();
        match self.thread.take() {
            Some(thread) => thread.join().is_ok(),
            None => true,
        }
    }
}
