//! Timer-driven progression engine for one tracked order.

use crate::config::TrackingConfig;
use crate::tracking::{
    domain::{
        OrderRef, OrderStage, ProgressSnapshot, ProgressionState, SessionId, TickOutcome,
        TrackingDomainError,
    },
    ports::{SchedulerError, SchedulerResult, SnapshotPublisher, TickScheduler, TimerHandle},
};
use mockable::Clock;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Service-level errors for order tracking operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TrackingDomainError),
    /// The timer facility rejected a request.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// The session was stopped and cannot be driven any further.
    #[error("tracking session {0} has ended")]
    SessionEnded(SessionId),
    /// No session is tracking the given order.
    #[error("no tracking session for order {0}")]
    SessionNotFound(OrderRef),
    /// The session registry lock was poisoned.
    #[error("tracking session registry is unavailable: {0}")]
    RegistryUnavailable(String),
}

/// Result type for tracking service operations.
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Lifecycle status of a progression engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// Created but not ticking on its own yet.
    Idle,
    /// Ticks are scheduled on the timer facility.
    Running,
    /// The session ended; state is frozen.
    Stopped,
}

/// Owns the current stage of one tracked order and advances it on a fixed
/// interval until the order is delivered.
///
/// Clones share the same engine. Every operation takes the engine lock, so
/// ticks, re-initialization and stopping are strictly serialized and at
/// most one timer is pending at any time.
pub struct ProgressionEngine<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    shared: Arc<EngineShared<S, P, C>>,
}

struct EngineShared<S, P, C> {
    session_id: SessionId,
    order_ref: OrderRef,
    tick_interval: Duration,
    scheduler: Arc<S>,
    publisher: Arc<P>,
    clock: Arc<C>,
    inner: Mutex<EngineInner>,
}

struct EngineInner {
    state: ProgressionState,
    status: EngineStatus,
    pending: Option<PendingTick>,
    next_generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingTick {
    handle: TimerHandle,
    generation: u64,
}

impl<S, P, C> Clone for ProgressionEngine<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, P, C> fmt::Debug for ProgressionEngine<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("ProgressionEngine")
            .field("session_id", &self.shared.session_id)
            .field("order_ref", &self.shared.order_ref)
            .field("stage", &inner.state.stage())
            .field("status", &inner.status)
            .finish_non_exhaustive()
    }
}

impl<S, P, C> ProgressionEngine<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an idle engine positioned at the configured initial stage.
    #[must_use]
    pub fn new(
        order_ref: OrderRef,
        config: &TrackingConfig,
        scheduler: Arc<S>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        let state = ProgressionState::new(config.initial_stage(), &*clock);
        Self {
            shared: Arc::new(EngineShared {
                session_id: SessionId::new(),
                order_ref,
                tick_interval: config.tick_interval(),
                scheduler,
                publisher,
                clock,
                inner: Mutex::new(EngineInner {
                    state,
                    status: EngineStatus::Idle,
                    pending: None,
                    next_generation: 0,
                }),
            }),
        }
    }

    /// Every mutation is a whole-value assignment, so a poisoned lock still
    /// guards a valid stage.
    fn lock_inner(&self) -> MutexGuard<'_, EngineInner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.shared.session_id
    }

    /// Returns the tracked order reference.
    #[must_use]
    pub fn order_ref(&self) -> &OrderRef {
        &self.shared.order_ref
    }

    /// Returns the interval between automatic ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.shared.tick_interval
    }

    /// Returns the current stage.
    #[must_use]
    pub fn current_stage(&self) -> OrderStage {
        self.lock_inner().state.stage()
    }

    /// Returns the position of the current stage in the lifecycle.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.lock_inner().state.step_index()
    }

    /// Returns the engine lifecycle status.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.lock_inner().status
    }

    /// Returns `true` while a timer may still advance the stage.
    #[must_use]
    pub fn has_pending_tick(&self) -> bool {
        self.lock_inner().pending.is_some()
    }

    /// Returns the current read-model.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.lock_inner();
        ProgressSnapshot::capture(&self.shared.order_ref, &inner.state)
    }

    /// Repositions the engine at `stage`.
    ///
    /// A running engine discards its pending timer and restarts the
    /// interval from the new stage.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::SessionEnded`] after [`Self::stop`], or a
    /// scheduler error when the replacement timer cannot be scheduled. In
    /// that case the stage is still repositioned and the engine drops back
    /// to [`EngineStatus::Idle`] so [`Self::start`] can re-arm it.
    pub fn initialize(&self, stage: OrderStage) -> TrackingResult<()> {
        let mut inner = self.lock_inner();
        if inner.status == EngineStatus::Stopped {
            return Err(TrackingError::SessionEnded(self.shared.session_id));
        }
        inner.state.reset(stage, &*self.shared.clock);
        tracing::info!(
            session_id = %self.shared.session_id,
            order_ref = %self.shared.order_ref,
            %stage,
            "progression initialized"
        );
        self.publish(&inner);
        if inner.status == EngineStatus::Running {
            self.cancel_pending(&mut inner);
            if !stage.is_terminal() {
                self.rearm_or_idle(&mut inner)?;
            }
        }
        Ok(())
    }

    /// Repositions the engine at the stage named by `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::InvalidStage`] for an unknown tag,
    /// leaving the current stage untouched, or any error of
    /// [`Self::initialize`].
    pub fn initialize_from_tag(&self, tag: &str) -> TrackingResult<()> {
        let stage = OrderStage::try_from(tag)?;
        self.initialize(stage)
    }

    /// Repositions the engine at the stage with lifecycle position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::InvalidStage`] for an index outside
    /// the lifecycle, leaving the current stage untouched, or any error of
    /// [`Self::initialize`].
    pub fn initialize_from_index(&self, index: usize) -> TrackingResult<()> {
        let stage = OrderStage::from_index(index)?;
        self.initialize(stage)
    }

    /// Starts automatic ticking.
    ///
    /// Publishes the current snapshot and schedules the first tick one
    /// interval from now. Starting a running engine does nothing; an engine
    /// already at the terminal stage publishes but schedules no timer.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::SessionEnded`] after [`Self::stop`], or a
    /// scheduler error when the first timer cannot be scheduled.
    pub fn start(&self) -> TrackingResult<()> {
        let mut inner = self.lock_inner();
        match inner.status {
            EngineStatus::Stopped => {
                return Err(TrackingError::SessionEnded(self.shared.session_id));
            }
            EngineStatus::Running => {
                tracing::debug!(
                    session_id = %self.shared.session_id,
                    "progression already running"
                );
                return Ok(());
            }
            EngineStatus::Idle => {}
        }

        if !inner.state.is_terminal() {
            self.schedule_next(&mut inner)?;
        }
        inner.status = EngineStatus::Running;
        tracing::info!(
            session_id = %self.shared.session_id,
            order_ref = %self.shared.order_ref,
            stage = %inner.state.stage(),
            interval = ?self.shared.tick_interval,
            "progression started"
        );
        self.publish(&inner);
        Ok(())
    }

    /// Advances the stage by one step.
    ///
    /// At the terminal stage nothing changes. After [`Self::stop`] the call
    /// is ignored and returns [`TickOutcome::Stopped`]. On a running engine
    /// the pending timer is replaced so the next automatic tick is one full
    /// interval away. If that timer cannot be scheduled the engine drops
    /// back to [`EngineStatus::Idle`].
    pub fn tick(&self) -> TickOutcome {
        let mut inner = self.lock_inner();
        if inner.status == EngineStatus::Stopped {
            tracing::debug!(
                session_id = %self.shared.session_id,
                "ignoring tick on stopped session"
            );
            return TickOutcome::Stopped;
        }
        if inner.status == EngineStatus::Running {
            self.cancel_pending(&mut inner);
        }
        self.advance_locked(&mut inner)
    }

    /// Ends the session: cancels the pending timer and freezes the stage.
    ///
    /// Stopping an ended session does nothing.
    pub fn stop(&self) {
        let mut inner = self.lock_inner();
        if inner.status == EngineStatus::Stopped {
            return;
        }
        self.cancel_pending(&mut inner);
        inner.status = EngineStatus::Stopped;
        tracing::info!(
            session_id = %self.shared.session_id,
            order_ref = %self.shared.order_ref,
            stage = %inner.state.stage(),
            "progression stopped"
        );
    }

    /// Entry point for scheduled callbacks.
    fn on_timer(&self, generation: u64) {
        let mut inner = self.lock_inner();
        let current = inner.pending.map(|pending| pending.generation);
        if inner.status != EngineStatus::Running || current != Some(generation) {
            tracing::debug!(
                session_id = %self.shared.session_id,
                generation,
                "ignoring stale timer"
            );
            return;
        }
        inner.pending = None;
        let outcome = self.advance_locked(&mut inner);
        tracing::debug!(session_id = %self.shared.session_id, ?outcome, "timer tick processed");
    }

    fn advance_locked(&self, inner: &mut EngineInner) -> TickOutcome {
        let outcome = inner.state.advance(&*self.shared.clock);
        let TickOutcome::Advanced { from, to } = outcome else {
            return outcome;
        };
        tracing::info!(
            session_id = %self.shared.session_id,
            order_ref = %self.shared.order_ref,
            %from,
            %to,
            "order stage advanced"
        );
        self.publish(inner);
        if inner.status == EngineStatus::Running && !to.is_terminal() {
            if let Err(err) = self.rearm_or_idle(inner) {
                tracing::error!(
                    session_id = %self.shared.session_id,
                    order_ref = %self.shared.order_ref,
                    stage = %to,
                    error = %err,
                    "failed to schedule next tick; progression is idle"
                );
            }
        }
        outcome
    }

    /// Schedules the next tick of a running engine. On failure the engine
    /// is left idle with no pending timer.
    fn rearm_or_idle(&self, inner: &mut EngineInner) -> SchedulerResult<()> {
        self.schedule_next(inner).inspect_err(|_| {
            inner.pending = None;
            inner.status = EngineStatus::Idle;
        })
    }

    fn schedule_next(&self, inner: &mut EngineInner) -> SchedulerResult<()> {
        let generation = inner.next_generation;
        inner.next_generation += 1;
        let engine = Arc::downgrade(&self.shared);
        let handle = self.shared.scheduler.schedule_once(
            self.shared.tick_interval,
            Box::new(move || {
                if let Some(shared) = engine.upgrade() {
                    Self { shared }.on_timer(generation);
                }
            }),
        )?;
        inner.pending = Some(PendingTick { handle, generation });
        Ok(())
    }

    fn cancel_pending(&self, inner: &mut EngineInner) {
        if let Some(pending) = inner.pending.take() {
            let cancelled = self.shared.scheduler.cancel(pending.handle);
            tracing::debug!(
                session_id = %self.shared.session_id,
                timer = %pending.handle,
                cancelled,
                "pending tick cancelled"
            );
        }
    }

    fn publish(&self, inner: &EngineInner) {
        let snapshot = ProgressSnapshot::capture(&self.shared.order_ref, &inner.state);
        if let Err(err) = self.shared.publisher.publish(&snapshot) {
            tracing::warn!(
                session_id = %self.shared.session_id,
                error = %err,
                "failed to publish progression snapshot"
            );
        }
    }
}
