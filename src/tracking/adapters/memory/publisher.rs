//! In-memory snapshot publisher for tests and local inspection.

use crate::tracking::{
    domain::{OrderStage, ProgressSnapshot},
    ports::{PublisherError, PublisherResult, SnapshotPublisher},
};
use std::sync::{Arc, RwLock};

/// Thread-safe publisher that keeps every snapshot it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSnapshotPublisher {
    snapshots: Arc<RwLock<Vec<ProgressSnapshot>>>,
}

impl RecordingSnapshotPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded snapshot in publication order.
    ///
    /// # Errors
    ///
    /// Returns publisher runtime errors when lock acquisition fails.
    pub fn snapshots(&self) -> PublisherResult<Vec<ProgressSnapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|err| PublisherError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(snapshots.clone())
    }

    /// Returns the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns publisher runtime errors when lock acquisition fails.
    pub fn last(&self) -> PublisherResult<Option<ProgressSnapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|err| PublisherError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(snapshots.last().cloned())
    }

    /// Returns the current stage of every recorded snapshot.
    ///
    /// # Errors
    ///
    /// Returns publisher runtime errors when lock acquisition fails.
    pub fn stages(&self) -> PublisherResult<Vec<OrderStage>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|err| PublisherError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(snapshots
            .iter()
            .map(ProgressSnapshot::current_stage)
            .collect())
    }
}

impl SnapshotPublisher for RecordingSnapshotPublisher {
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|err| PublisherError::runtime(std::io::Error::other(err.to_string())))?;
        snapshots.push(snapshot.clone());
        Ok(())
    }
}
