//! Scoped ownership of a running progression engine.

use super::progression::{ProgressionEngine, TrackingResult};
use crate::config::TrackingConfig;
use crate::tracking::{
    domain::{OrderRef, OrderStage, ProgressSnapshot},
    ports::{SnapshotPublisher, TickScheduler},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;

/// One tracking session: a started engine that is stopped when the session
/// is ended or dropped.
///
/// Ending the session cancels the pending timer before returning, so no
/// tick can mutate the stage once the owner has stopped observing it.
pub struct TrackingSession<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    engine: ProgressionEngine<S, P, C>,
}

impl<S, P, C> TrackingSession<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an engine for `order_ref` and starts ticking.
    ///
    /// # Errors
    ///
    /// Returns a scheduler error when the first tick cannot be scheduled.
    pub fn start(
        order_ref: OrderRef,
        config: &TrackingConfig,
        scheduler: Arc<S>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> TrackingResult<Self> {
        let engine = ProgressionEngine::new(order_ref, config, scheduler, publisher, clock);
        engine.start()?;
        Ok(Self { engine })
    }

    /// Returns the engine driven by this session.
    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine<S, P, C> {
        &self.engine
    }

    /// Returns the current stage.
    #[must_use]
    pub fn current_stage(&self) -> OrderStage {
        self.engine.current_stage()
    }

    /// Returns the current read-model.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.engine.snapshot()
    }

    /// Ends the session and returns the final snapshot.
    #[must_use]
    pub fn end(self) -> ProgressSnapshot {
        self.engine.stop();
        self.engine.snapshot()
    }
}

impl<S, P, C> fmt::Debug for TrackingSession<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingSession")
            .field("engine", &self.engine)
            .finish()
    }
}

impl<S, P, C> Drop for TrackingSession<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.engine.stop();
    }
}
