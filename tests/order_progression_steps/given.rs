//! Given steps for order progression BDD scenarios.

use super::world::TrackingWorld;
use mockable::DefaultClock;
use ordertrack::{config::TrackingConfig, tracking::services::OrderTrackingService};
use rstest_bdd_macros::given;
use std::sync::Arc;
use std::time::Duration;

#[given("an order tracking service ticking every {millis:u64} ms")]
fn tracking_service(world: &mut TrackingWorld, millis: u64) -> Result<(), eyre::Report> {
    let config = TrackingConfig::default().with_tick_interval(Duration::from_millis(millis))?;
    world.service = Some(OrderTrackingService::new(
        config,
        Arc::clone(&world.scheduler),
        Arc::clone(&world.publisher),
        Arc::new(DefaultClock),
    ));
    Ok(())
}
