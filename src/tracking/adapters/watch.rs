//! Publisher exposing the latest snapshot through a tokio watch channel.

use crate::tracking::{
    domain::ProgressSnapshot,
    ports::{PublisherResult, SnapshotPublisher},
};
use tokio::sync::watch;

/// Publisher that keeps only the latest snapshot for any number of
/// subscribers.
///
/// Publishing never fails, even with no subscribers attached.
#[derive(Debug, Clone)]
pub struct WatchSnapshotPublisher {
    sender: watch::Sender<Option<ProgressSnapshot>>,
}

impl WatchSnapshotPublisher {
    /// Creates a publisher with no snapshot yet.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Returns a receiver that observes every subsequent snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<ProgressSnapshot>> {
        self.sender.subscribe()
    }

    /// Returns the latest published snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<ProgressSnapshot> {
        self.sender.borrow().clone()
    }
}

impl Default for WatchSnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher for WatchSnapshotPublisher {
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()> {
        self.sender.send_replace(Some(snapshot.clone()));
        Ok(())
    }
}
