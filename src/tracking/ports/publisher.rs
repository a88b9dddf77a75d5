//! Publishing port between the progression engine and renderers.

use crate::tracking::domain::ProgressSnapshot;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot publishing.
pub type PublisherResult<T> = Result<T, PublisherError>;

/// Sink for progression snapshots.
///
/// Called with the engine lock held, once per state change and in change
/// order. Implementations must not call back into the engine.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotPublisher: Send + Sync {
    /// Publishes a freshly computed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError`] when the snapshot cannot be delivered.
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()>;
}

/// Errors returned by publisher adapters.
#[derive(Debug, Clone, Error)]
pub enum PublisherError {
    /// Template rendering failed.
    #[error("failed to render tracker view: {reason}")]
    Render {
        /// Renderer diagnostic.
        reason: String,
    },

    /// Generic publisher failure.
    #[error("publisher runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl PublisherError {
    /// Wraps a runtime error from the publisher adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
