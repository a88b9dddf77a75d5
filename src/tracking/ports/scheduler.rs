//! Scheduling port used to drive progression ticks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// One-shot callback run when a timer fires.
pub type TickCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle for a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wraps an adapter-assigned timer number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the adapter-assigned timer number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Host timer facility contract.
///
/// Implementations run each callback at most once, no earlier than the
/// requested delay. Cancelling a handle before its callback starts
/// guarantees the callback never runs.
pub trait TickScheduler: Send + Sync {
    /// Schedules `callback` to run once after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when the host facility is unavailable.
    fn schedule_once(
        &self,
        delay: Duration,
        callback: TickCallback,
    ) -> SchedulerResult<TimerHandle>;

    /// Cancels a pending callback.
    ///
    /// Returns `true` when the callback was still pending and will not run,
    /// `false` when it already ran, is running, or was never known.
    #[must_use]
    fn cancel(&self, handle: TimerHandle) -> bool;
}

/// Errors returned by scheduler adapters.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// No async runtime is available to host timers.
    #[error("no async runtime available to host timers")]
    NoRuntime,

    /// Generic scheduler failure.
    #[error("scheduler runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchedulerError {
    /// Wraps a runtime error from the scheduler adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
