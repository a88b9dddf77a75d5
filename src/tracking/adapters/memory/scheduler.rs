//! Deterministic scheduler driven by a virtual clock.

use crate::tracking::ports::{
    SchedulerError, SchedulerResult, TickCallback, TickScheduler, TimerHandle,
};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Scheduler whose time only moves when the caller advances it.
///
/// Callbacks run on the caller's thread inside [`Self::advance`] and
/// [`Self::fire_next`], never inside [`TickScheduler::schedule_once`].
/// The most recent [`Self::PARKED_LIMIT`] cancelled callbacks are parked
/// rather than dropped so tests can replay a callback that lost the race
/// with cancellation. Older ones are dropped.
#[derive(Clone, Default)]
pub struct ManualTickScheduler {
    state: Arc<Mutex<ManualSchedulerState>>,
}

#[derive(Default)]
struct ManualSchedulerState {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerHandle, PendingTimer>,
    cancelled: VecDeque<TickCallback>,
    fired: u64,
}

struct PendingTimer {
    due: Duration,
    callback: TickCallback,
}

impl ManualTickScheduler {
    /// Maximum number of cancelled callbacks kept for replay.
    pub const PARKED_LIMIT: usize = 16;

    /// Creates a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SchedulerResult<MutexGuard<'_, ManualSchedulerState>> {
        self.state
            .lock()
            .map_err(|err| SchedulerError::runtime(std::io::Error::other(err.to_string())))
    }

    /// Returns the current virtual time.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn now(&self) -> SchedulerResult<Duration> {
        Ok(self.lock()?.now)
    }

    /// Returns the number of callbacks waiting to fire.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn pending_count(&self) -> SchedulerResult<usize> {
        Ok(self.lock()?.pending.len())
    }

    /// Returns how many callbacks have run so far.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn fired_count(&self) -> SchedulerResult<u64> {
        Ok(self.lock()?.fired)
    }

    /// Returns the virtual time at which the next callback is due.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn next_due(&self) -> SchedulerResult<Option<Duration>> {
        Ok(self.lock()?.pending.values().map(|timer| timer.due).min())
    }

    /// Moves virtual time forward by `by`, running every callback that
    /// falls due on the way in due order.
    ///
    /// Callbacks scheduled by a running callback also fire when they fall
    /// inside the window. Returns the number of callbacks run.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn advance(&self, by: Duration) -> SchedulerResult<usize> {
        let target = self.lock()?.now.saturating_add(by);
        let mut fired = 0;
        while let Some(callback) = self.take_due(target)? {
            callback();
            fired += 1;
        }
        self.lock()?.now = target;
        Ok(fired)
    }

    /// Jumps virtual time to the next due callback and runs it.
    ///
    /// Returns `false` when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn fire_next(&self) -> SchedulerResult<bool> {
        let Some(due) = self.next_due()? else {
            return Ok(false);
        };
        match self.take_due(due)? {
            Some(callback) => {
                callback();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs every parked cancelled callback, oldest first, as a host would if
    /// cancellation arrived after the callback had already been dispatched.
    ///
    /// Returns the number of callbacks replayed.
    ///
    /// # Errors
    ///
    /// Returns scheduler runtime errors when lock acquisition fails.
    pub fn replay_cancelled(&self) -> SchedulerResult<usize> {
        let callbacks = std::mem::take(&mut self.lock()?.cancelled);
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        Ok(count)
    }

    /// Removes the earliest callback due at or before `target`.
    ///
    /// The lock is released before the caller runs the callback so the
    /// callback may schedule again.
    fn take_due(&self, target: Duration) -> SchedulerResult<Option<TickCallback>> {
        let mut state = self.lock()?;
        let next = state
            .pending
            .iter()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(handle, timer)| (timer.due, **handle))
            .map(|(handle, _)| *handle);
        let Some(handle) = next else {
            return Ok(None);
        };
        let Some(timer) = state.pending.remove(&handle) else {
            return Ok(None);
        };
        state.now = state.now.max(timer.due);
        state.fired += 1;
        Ok(Some(timer.callback))
    }
}

impl fmt::Debug for ManualTickScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ManualTickScheduler");
        if let Ok(state) = self.state.lock() {
            debug
                .field("now", &state.now)
                .field("pending", &state.pending.len())
                .field("cancelled", &state.cancelled.len())
                .field("fired", &state.fired);
        }
        debug.finish_non_exhaustive()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_once(
        &self,
        delay: Duration,
        callback: TickCallback,
    ) -> SchedulerResult<TimerHandle> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let handle = TimerHandle::new(state.next_id);
        let due = state.now.saturating_add(delay);
        state.pending.insert(handle, PendingTimer { due, callback });
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        match state.pending.remove(&handle) {
            Some(timer) => {
                if state.cancelled.len() >= Self::PARKED_LIMIT {
                    state.cancelled.pop_front();
                }
                state.cancelled.push_back(timer.callback);
                true
            }
            None => false,
        }
    }
}
