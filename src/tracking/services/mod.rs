//! Application services for order progression tracking.

mod progression;
mod session;
mod tracking;

pub use progression::{EngineStatus, ProgressionEngine, TrackingError, TrackingResult};
pub use session::TrackingSession;
pub use tracking::OrderTrackingService;
