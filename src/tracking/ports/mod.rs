//! Port contracts for order progression tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by tracking
//! services: the timer facility that drives ticks and the sink that
//! receives snapshots.

pub mod publisher;
pub mod scheduler;

pub use publisher::{PublisherError, PublisherResult, SnapshotPublisher};
pub use scheduler::{SchedulerError, SchedulerResult, TickCallback, TickScheduler, TimerHandle};
