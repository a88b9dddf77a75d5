//! In-memory adapters for deterministic tracking tests.

mod publisher;
mod scheduler;

pub use publisher::RecordingSnapshotPublisher;
pub use scheduler::ManualTickScheduler;
