//! Polling supervisor for an active repeat session.
//!
//! The supervisor is a tokio task that calls back into the controller on a
//! fixed interval. It carries the generation of the session it was spawned
//! for; the controller compares that generation on every tick, so a tick
//! that races a `stop()` or a newer `start()` is a no-op and ends the task.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// What the tick body wants the supervisor to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep polling.
    Continue,
    /// The session completed or was replaced; stop polling.
    Finished,
}

/// Handle to a running supervisor task. Dropping it cancels the task.
#[derive(Debug)]
pub struct Supervisor {
    handle: JoinHandle<()>,
}

impl Supervisor {
    /// Spawn a supervisor on the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime; the caller then has to
    /// drive ticks itself.
    pub fn spawn<F>(generation: u64, period: Duration, mut tick: F) -> Option<Self>
    where
        F: FnMut() -> TickOutcome + Send + 'static,
    {
        let runtime = Handle::try_current().ok()?;
        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick() == TickOutcome::Finished {
                    debug!(generation, "Supervisor finished");
                    break;
                }
            }
        });
        debug!(generation, period_ms = period.as_millis() as u64, "Supervisor armed");
        Some(Self { handle })
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task. Ticks already in flight are rejected by generation.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
