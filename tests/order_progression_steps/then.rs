//! Then steps for order progression BDD scenarios.

use super::world::TrackingWorld;
use ordertrack::tracking::{
    domain::{OrderStage, TrackingDomainError},
    services::{EngineStatus, TrackingError},
};
use rstest_bdd_macros::then;

fn parse_stage(stage: &str) -> Result<OrderStage, eyre::Report> {
    OrderStage::try_from(stage).map_err(|err| eyre::eyre!("invalid stage in scenario: {err}"))
}

#[then(r#"order "{order_ref}" is at stage "{stage}""#)]
fn order_is_at_stage(
    world: &TrackingWorld,
    order_ref: String,
    stage: String,
) -> Result<(), eyre::Report> {
    let expected = parse_stage(&stage)?;
    let snapshot = world.service()?.snapshot(&order_ref)?;

    if snapshot.current_stage() != expected {
        return Err(eyre::eyre!(
            "expected stage {expected}, found {}",
            snapshot.current_stage()
        ));
    }
    Ok(())
}

#[then("the tracker shows {percent:u8} percent progress")]
fn tracker_shows_progress(world: &TrackingWorld, percent: u8) -> Result<(), eyre::Report> {
    let snapshot = world
        .publisher
        .last()?
        .ok_or_else(|| eyre::eyre!("no snapshot was published"))?;

    if snapshot.progress_percent() != percent {
        return Err(eyre::eyre!(
            "expected {percent}% progress, found {}%",
            snapshot.progress_percent()
        ));
    }
    Ok(())
}

#[then("no tick is pending")]
fn no_tick_pending(world: &TrackingWorld) -> Result<(), eyre::Report> {
    let pending = world.scheduler.pending_count()?;
    if pending != 0 {
        return Err(eyre::eyre!("expected no pending ticks, found {pending}"));
    }
    Ok(())
}

#[then(r#"the closed order stopped at stage "{stage}""#)]
fn closed_order_stopped_at(world: &TrackingWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = parse_stage(&stage)?;
    let snapshot = world
        .closed_snapshot
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no order was closed"))?;
    let engine = world.engine()?;

    eyre::ensure!(
        snapshot.current_stage() == expected,
        "closed at {}, expected {expected}",
        snapshot.current_stage()
    );
    eyre::ensure!(
        engine.current_stage() == expected,
        "stage moved to {} after close",
        engine.current_stage()
    );
    eyre::ensure!(
        engine.status() == EngineStatus::Stopped,
        "engine still {:?}",
        engine.status()
    );
    Ok(())
}

#[then("the re-initialization fails with an invalid stage error")]
fn reinitialization_fails(world: &TrackingWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_initialize_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing re-initialization result"))?;

    if !matches!(
        result,
        Err(TrackingError::Domain(TrackingDomainError::InvalidStage(_)))
    ) {
        return Err(eyre::eyre!("expected InvalidStage error, got {result:?}"));
    }
    Ok(())
}

#[then("opening fails with an invalid order reference error")]
fn opening_fails(world: &TrackingWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_open_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("opening unexpectedly succeeded"))?;

    if !matches!(
        error,
        TrackingError::Domain(TrackingDomainError::InvalidOrderRef(_))
    ) {
        return Err(eyre::eyre!("expected InvalidOrderRef error, got {error:?}"));
    }
    Ok(())
}
