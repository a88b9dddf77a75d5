//! Adapter implementations for tracking ports.

pub mod logging;
pub mod memory;
pub mod runtime;
pub mod template;
pub mod watch;

pub use logging::TracingSnapshotPublisher;
pub use runtime::TokioTickScheduler;
pub use template::{DEFAULT_TRACKER_TEMPLATE, TemplateSnapshotRenderer};
pub use watch::WatchSnapshotPublisher;
