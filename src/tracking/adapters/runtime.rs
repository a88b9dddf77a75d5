//! Tokio-backed timer adapter.

use crate::tracking::ports::{
    SchedulerError, SchedulerResult, TickCallback, TickScheduler, TimerHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Scheduler that hosts each timer as a sleeping task on a tokio runtime.
///
/// A timer task claims its own entry before running the callback. Whoever
/// removes the entry first wins: [`TickScheduler::cancel`] aborts the task,
/// or the task runs the callback and `cancel` reports `false`.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    runtime: Handle,
    state: Arc<Mutex<TokioTimerState>>,
}

#[derive(Debug, Default)]
struct TokioTimerState {
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioTickScheduler {
    /// Creates a scheduler that spawns timers on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            state: Arc::new(Mutex::new(TokioTimerState::default())),
        }
    }

    /// Creates a scheduler bound to the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoRuntime`] outside a tokio runtime.
    pub fn current() -> SchedulerResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| SchedulerError::NoRuntime)
    }

    /// Returns the number of timers that have neither fired nor been
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn pending_count(&self) -> SchedulerResult<usize> {
        let state = self
            .state
            .lock()
            .map_err(|err| SchedulerError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state.tasks.len())
    }
}

/// Removes the timer entry, returning `false` when it was already cancelled.
fn claim(timers: &Weak<Mutex<TokioTimerState>>, handle: TimerHandle) -> bool {
    let Some(state) = timers.upgrade() else {
        return false;
    };
    state
        .lock()
        .is_ok_and(|mut guard| guard.tasks.remove(&handle).is_some())
}

impl TickScheduler for TokioTickScheduler {
    fn schedule_once(
        &self,
        delay: Duration,
        callback: TickCallback,
    ) -> SchedulerResult<TimerHandle> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| SchedulerError::runtime(std::io::Error::other(err.to_string())))?;
        state.next_id += 1;
        let handle = TimerHandle::new(state.next_id);
        let timers = Arc::downgrade(&self.state);

        // The entry is inserted before the lock is released, so the task
        // cannot claim it early.
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if claim(&timers, handle) {
                callback();
            }
        });
        state.tasks.insert(handle, task);
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        match state.tasks.remove(&handle) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}
