//! Shared world state for order progression BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use ordertrack::tracking::{
    adapters::memory::{ManualTickScheduler, RecordingSnapshotPublisher},
    domain::ProgressSnapshot,
    services::{OrderTrackingService, ProgressionEngine, TrackingError, TrackingResult},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTrackingService =
    OrderTrackingService<ManualTickScheduler, RecordingSnapshotPublisher, DefaultClock>;

/// Engine type handed out by [`TestTrackingService`].
pub type TestEngine =
    ProgressionEngine<ManualTickScheduler, RecordingSnapshotPublisher, DefaultClock>;

/// Scenario world for order progression behaviour tests.
pub struct TrackingWorld {
    pub scheduler: Arc<ManualTickScheduler>,
    pub publisher: Arc<RecordingSnapshotPublisher>,
    pub service: Option<TestTrackingService>,
    pub engine: Option<TestEngine>,
    pub last_open_error: Option<TrackingError>,
    pub last_initialize_result: Option<TrackingResult<()>>,
    pub closed_snapshot: Option<ProgressSnapshot>,
}

impl TrackingWorld {
    /// Creates a world with a fresh virtual clock and no service yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheduler: Arc::new(ManualTickScheduler::new()),
            publisher: Arc::new(RecordingSnapshotPublisher::new()),
            service: None,
            engine: None,
            last_open_error: None,
            last_initialize_result: None,
            closed_snapshot: None,
        }
    }

    /// Returns the service created by the `Given` step.
    pub fn service(&self) -> Result<&TestTrackingService, eyre::Report> {
        self.service
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing tracking service in scenario world"))
    }

    /// Returns the engine of the most recently opened order.
    pub fn engine(&self) -> Result<&TestEngine, eyre::Report> {
        self.engine
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing opened order in scenario world"))
    }
}

impl Default for TrackingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TrackingWorld {
    TrackingWorld::default()
}
