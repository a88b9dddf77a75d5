//! Integration tests for the tokio timer adapter with paused time.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use ordertrack::config::TrackingConfig;
use ordertrack::tracking::{
    adapters::{TokioTickScheduler, WatchSnapshotPublisher},
    domain::{OrderStage, ProgressSnapshot},
    ports::{SchedulerError, TickScheduler},
    services::OrderTrackingService,
};
use rstest::rstest;
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout};

const INTERVAL: Duration = Duration::from_secs(5);

#[rstest]
fn current_requires_a_runtime() {
    assert!(matches!(
        TokioTickScheduler::current(),
        Err(SchedulerError::NoRuntime)
    ));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn callback_runs_after_the_delay() -> eyre::Result<()> {
    let scheduler = TokioTickScheduler::current()?;
    let (sender, receiver) = oneshot::channel();
    let started = Instant::now();

    scheduler.schedule_once(
        INTERVAL,
        Box::new(move || {
            drop(sender.send(Instant::now()));
        }),
    )?;
    let fired_at = receiver.await?;

    eyre::ensure!(fired_at - started >= INTERVAL, "callback fired early");
    eyre::ensure!(scheduler.pending_count()? == 0, "fired timer still tracked");
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancelled_callback_never_runs() -> eyre::Result<()> {
    let scheduler = TokioTickScheduler::current()?;
    let (sender, receiver) = oneshot::channel::<()>();

    let handle = scheduler.schedule_once(
        INTERVAL,
        Box::new(move || {
            drop(sender.send(()));
        }),
    )?;
    eyre::ensure!(scheduler.cancel(handle), "cancel should find the timer");
    eyre::ensure!(!scheduler.cancel(handle), "second cancel should report false");

    // Aborting the task drops the callback, which closes the channel.
    eyre::ensure!(receiver.await.is_err(), "cancelled callback ran");
    eyre::ensure!(scheduler.pending_count()? == 0, "cancelled timer still tracked");
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn tracked_order_is_delivered_on_schedule() -> eyre::Result<()> {
    let scheduler = Arc::new(TokioTickScheduler::current()?);
    let publisher = Arc::new(WatchSnapshotPublisher::new());
    let mut updates = publisher.subscribe();
    let service = OrderTrackingService::new(
        TrackingConfig::default(),
        Arc::clone(&scheduler),
        Arc::clone(&publisher),
        Arc::new(DefaultClock),
    );
    let started = Instant::now();

    service.open("FD-12345XYZ")?;
    let stages = timeout(Duration::from_secs(60), async {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            let Some(snapshot) = updates.borrow_and_update().clone() else {
                continue;
            };
            seen.push(snapshot.current_stage());
            if snapshot.is_terminal() {
                break;
            }
        }
        seen
    })
    .await?;

    eyre::ensure!(stages == OrderStage::ALL.to_vec(), "unexpected stages {stages:?}");
    let elapsed = started.elapsed();
    eyre::ensure!(
        elapsed >= INTERVAL * 3 && elapsed < INTERVAL * 4,
        "delivery took {elapsed:?}"
    );
    eyre::ensure!(scheduler.pending_count()? == 0, "timer left after delivery");
    eyre::ensure!(service.close_all()? == 1, "session should still be registered");
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn closing_an_order_cancels_its_timer() -> eyre::Result<()> {
    let scheduler = Arc::new(TokioTickScheduler::current()?);
    let publisher = Arc::new(WatchSnapshotPublisher::new());
    let service = OrderTrackingService::new(
        TrackingConfig::default(),
        Arc::clone(&scheduler),
        Arc::clone(&publisher),
        Arc::new(DefaultClock),
    );

    let engine = service.open("FD-1")?;
    tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
    let closed = service.close("FD-1")?;
    tokio::time::sleep(INTERVAL * 10).await;

    eyre::ensure!(
        closed.current_stage() == OrderStage::Preparing,
        "closed at {}",
        closed.current_stage()
    );
    eyre::ensure!(
        engine.current_stage() == OrderStage::Preparing,
        "stage moved after close"
    );
    eyre::ensure!(scheduler.pending_count()? == 0, "timer left after close");
    eyre::ensure!(
        publisher.latest().as_ref().map(ProgressSnapshot::current_stage)
            == Some(OrderStage::Preparing),
        "publisher saw a change after close"
    );
    Ok(())
}
