//! When steps for order progression BDD scenarios.

use super::world::TrackingWorld;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use std::time::Duration;

#[when(r#"order "{order_ref}" is opened"#)]
fn open_order(world: &mut TrackingWorld, order_ref: String) -> Result<(), eyre::Report> {
    match world.service()?.open(&order_ref) {
        Ok(engine) => world.engine = Some(engine),
        Err(err) => world.last_open_error = Some(err),
    }
    Ok(())
}

#[when("{millis:u64} ms elapse")]
fn time_elapses(world: &mut TrackingWorld, millis: u64) -> Result<(), eyre::Report> {
    world
        .scheduler
        .advance(Duration::from_millis(millis))
        .wrap_err("advance virtual time")?;
    Ok(())
}

#[when(r#"order "{order_ref}" is closed"#)]
fn close_order(world: &mut TrackingWorld, order_ref: String) -> Result<(), eyre::Report> {
    let snapshot = world
        .service()?
        .close(&order_ref)
        .wrap_err("close tracked order")?;
    world.closed_snapshot = Some(snapshot);
    Ok(())
}

#[when(r#"the order is re-initialized to stage "{tag}""#)]
fn reinitialize_order(world: &mut TrackingWorld, tag: String) -> Result<(), eyre::Report> {
    let result = world.engine()?.initialize_from_tag(&tag);
    world.last_initialize_result = Some(result);
    Ok(())
}
