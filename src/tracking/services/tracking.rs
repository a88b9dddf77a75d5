//! Registry of tracking sessions keyed by order reference.

use super::{
    progression::{EngineStatus, ProgressionEngine, TrackingError, TrackingResult},
    session::TrackingSession,
};
use crate::config::TrackingConfig;
use crate::tracking::{
    domain::{OrderRef, ProgressSnapshot},
    ports::{SnapshotPublisher, TickScheduler},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type SessionMap<S, P, C> = HashMap<OrderRef, TrackingSession<S, P, C>>;

/// Order tracking orchestration service.
///
/// Holds at most one session per order. Opening an order that is already
/// tracked returns the existing engine instead of starting a second timer;
/// an order whose engine was stopped gets a fresh session.
///
/// Sessions stay registered after delivery so their final snapshot remains
/// readable. They are released by [`Self::close`], [`Self::close_all`] or
/// [`Self::close_delivered`].
pub struct OrderTrackingService<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    config: TrackingConfig,
    scheduler: Arc<S>,
    publisher: Arc<P>,
    clock: Arc<C>,
    sessions: Arc<RwLock<SessionMap<S, P, C>>>,
}

impl<S, P, C> Clone for OrderTrackingService<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            scheduler: Arc::clone(&self.scheduler),
            publisher: Arc::clone(&self.publisher),
            clock: Arc::clone(&self.clock),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<S, P, C> OrderTrackingService<S, P, C>
where
    S: TickScheduler + 'static,
    P: SnapshotPublisher + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a tracking service.
    #[must_use]
    pub fn new(
        config: TrackingConfig,
        scheduler: Arc<S>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            config,
            scheduler,
            publisher,
            clock,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the configuration applied to new sessions.
    #[must_use]
    pub const fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Starts tracking an order, or returns the engine already tracking it.
    ///
    /// An existing engine that was stopped is replaced by a new session. An
    /// existing idle engine is started again.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Domain`] for an invalid order reference, or
    /// a scheduler error when the first tick cannot be scheduled.
    pub fn open(&self, reference: &str) -> TrackingResult<ProgressionEngine<S, P, C>> {
        let order_ref = OrderRef::new(reference)?;
        let mut sessions = self
            .sessions
            .write()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?;
        match sessions.get(&order_ref).map(TrackingSession::engine) {
            Some(existing) if existing.status() == EngineStatus::Stopped => {
                tracing::info!(
                    %order_ref,
                    session_id = %existing.session_id(),
                    "replacing stopped tracking session"
                );
                sessions.remove(&order_ref);
            }
            Some(existing) => {
                tracing::debug!(%order_ref, "order already tracked");
                existing.start()?;
                return Ok(existing.clone());
            }
            None => {}
        }

        let session = TrackingSession::start(
            order_ref.clone(),
            &self.config,
            Arc::clone(&self.scheduler),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
        )?;
        let engine = session.engine().clone();
        tracing::info!(%order_ref, session_id = %engine.session_id(), "tracking session opened");
        sessions.insert(order_ref, session);
        Ok(engine)
    }

    /// Returns the current snapshot for a tracked order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::SessionNotFound`] when the order is not
    /// tracked.
    pub fn snapshot(&self, reference: &str) -> TrackingResult<ProgressSnapshot> {
        let order_ref = OrderRef::new(reference)?;
        let sessions = self
            .sessions
            .read()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?;
        sessions
            .get(&order_ref)
            .map(TrackingSession::snapshot)
            .ok_or(TrackingError::SessionNotFound(order_ref))
    }

    /// Stops tracking an order and returns its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::SessionNotFound`] when the order is not
    /// tracked.
    pub fn close(&self, reference: &str) -> TrackingResult<ProgressSnapshot> {
        let order_ref = OrderRef::new(reference)?;
        let session = self
            .sessions
            .write()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?
            .remove(&order_ref)
            .ok_or_else(|| TrackingError::SessionNotFound(order_ref.clone()))?;
        let snapshot = session.end();
        tracing::info!(%order_ref, stage = %snapshot.current_stage(), "tracking session closed");
        Ok(snapshot)
    }

    /// Returns the tracked order references in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::RegistryUnavailable`] when the registry lock
    /// is poisoned.
    pub fn open_orders(&self) -> TrackingResult<Vec<OrderRef>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?;
        let mut orders: Vec<OrderRef> = sessions.keys().cloned().collect();
        orders.sort();
        Ok(orders)
    }

    /// Releases every session whose order was delivered and returns how
    /// many were released.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::RegistryUnavailable`] when the registry lock
    /// is poisoned.
    pub fn close_delivered(&self) -> TrackingResult<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?;
        let delivered: Vec<OrderRef> = sessions
            .iter()
            .filter(|(_, session)| session.snapshot().is_terminal())
            .map(|(order_ref, _)| order_ref.clone())
            .collect();
        for order_ref in &delivered {
            if let Some(session) = sessions.remove(order_ref) {
                let snapshot = session.end();
                tracing::info!(
                    %order_ref,
                    stage = %snapshot.current_stage(),
                    "delivered tracking session released"
                );
            }
        }
        Ok(delivered.len())
    }

    /// Stops every session and returns how many were closed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::RegistryUnavailable`] when the registry lock
    /// is poisoned.
    pub fn close_all(&self) -> TrackingResult<usize> {
        let drained: Vec<_> = self
            .sessions
            .write()
            .map_err(|err| TrackingError::RegistryUnavailable(err.to_string()))?
            .drain()
            .collect();
        let closed = drained.len();
        for (order_ref, session) in drained {
            let snapshot = session.end();
            tracing::info!(
                %order_ref,
                stage = %snapshot.current_stage(),
                "tracking session closed"
            );
        }
        Ok(closed)
    }
}
