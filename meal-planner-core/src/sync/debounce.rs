//! A cancelable, replaceable scheduled task.
//!
//! [`Debouncer::schedule`] arms a timer for a job. Scheduling again before the
//! window elapses replaces the waiting job, so a burst of calls runs only the
//! last job, once, after a quiet period.
//!
//! Once the window elapses the job is moved into its own task and is in
//! flight. An in-flight job is never cancelled: later calls to `schedule` or
//! `cancel` only affect the job still waiting on its timer.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::lock;

/// Default quiet period before a scheduled push runs.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(2000);

struct Timer {
    handle: JoinHandle<()>,
    deadline: Instant,
}

#[derive(Default)]
struct Slot {
    /// Bumped on every schedule/cancel; a timer only fires if it still matches.
    generation: u64,
    timer: Option<Timer>,
    /// Fired jobs that may still be running. Finished ones are pruned on each fire.
    in_flight: Vec<JoinHandle<()>>,
}

/// Schedule-replace-cancel task runner.
///
/// Tasks are spawned on the Tokio runtime current when the debouncer was
/// created, or the one later passed to [`Debouncer::bind`], so `schedule`
/// may be called from synchronous code.
pub struct Debouncer {
    window: Duration,
    runtime: Option<Handle>,
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            runtime: Handle::try_current().ok(),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Spawns future tasks on `runtime`.
    pub fn bind(&mut self, runtime: Handle) {
        self.runtime = Some(runtime);
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Runs `job` after the window, replacing any job still waiting.
    ///
    /// Returns `false`, dropping the job, when no runtime is available.
    pub fn schedule<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule_boxed(Box::pin(job))
    }

    fn schedule_boxed(&self, job: BoxFuture<'static, ()>) -> bool {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!("No Tokio runtime available; dropping scheduled job");
            return false;
        };

        let mut slot = lock(&self.slot);
        slot.generation += 1;
        let generation = slot.generation;
        if let Some(previous) = slot.timer.take() {
            previous.handle.abort();
        }

        let deadline = Instant::now() + self.window;
        let shared = Arc::clone(&self.slot);
        let spawner = runtime.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = lock(&shared);
            if slot.generation != generation {
                return;
            }
            slot.timer = None;
            slot.in_flight.retain(|h| !h.is_finished());
            slot.in_flight.push(spawner.spawn(job));
        });

        slot.timer = Some(Timer { handle, deadline });
        true
    }

    /// Cancels the waiting job, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        match slot.timer.take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    /// True while a job is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot).timer.is_some()
    }

    /// True while any fired job is still running.
    pub fn is_in_flight(&self) -> bool {
        lock(&self.slot)
            .in_flight
            .iter()
            .any(|handle| !handle.is_finished())
    }

    /// Fraction of the window elapsed for the waiting job, in `[0, 1]`.
    ///
    /// Purely informational; `None` when nothing is waiting.
    pub fn progress(&self) -> Option<f64> {
        let slot = lock(&self.slot);
        let timer = slot.timer.as_ref()?;
        if self.window.is_zero() {
            return Some(1.0);
        }
        let remaining = timer.deadline.saturating_duration_since(Instant::now());
        let elapsed = self.window.saturating_sub(remaining);
        Some((elapsed.as_secs_f64() / self.window.as_secs_f64()).clamp(0.0, 1.0))
    }

    /// Waits for the waiting job to fire and for every in-flight job to finish.
    pub async fn settle(&self) {
        loop {
            let deadline = lock(&self.slot).timer.as_ref().map(|t| t.deadline);
            match deadline {
                Some(deadline) => {
                    tokio::time::sleep_until(deadline).await;
                    tokio::task::yield_now().await;
                }
                None => break,
            }
        }

        let in_flight = std::mem::take(&mut lock(&self.slot).in_flight);
        for handle in in_flight {
            let _ = handle.await;
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
