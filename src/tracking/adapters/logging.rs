//! Publisher that reports snapshots as structured log events.

use crate::tracking::{
    domain::ProgressSnapshot,
    ports::{PublisherResult, SnapshotPublisher},
};

/// Publisher emitting one `tracing` event per snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSnapshotPublisher;

impl TracingSnapshotPublisher {
    /// Creates the publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SnapshotPublisher for TracingSnapshotPublisher {
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()> {
        tracing::info!(
            order_ref = %snapshot.order_ref(),
            stage = %snapshot.current_stage(),
            step_index = snapshot.step_index(),
            progress = snapshot.progress_fraction(),
            "{}",
            snapshot.status_line()
        );
        Ok(())
    }
}
