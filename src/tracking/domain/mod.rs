//! Domain model for order progression tracking.
//!
//! The tracking domain models the fixed order lifecycle, the mutable
//! progression of one tracked order, and the snapshot handed to renderers.
//! Scheduling and publishing stay outside the domain boundary.

mod error;
mod ids;
mod progression;
mod snapshot;
mod stage;

pub use error::TrackingDomainError;
pub use ids::{OrderRef, SessionId};
pub use progression::{ProgressionState, TickOutcome};
pub use snapshot::{ProgressSnapshot, StepView};
pub use stage::{OrderStage, STAGE_SEQUENCE, StageDescriptor, StageIcon};
