//! Tracks one order from confirmation to delivery in the terminal.
//!
//! Usage:
//!
//! ```text
//! track_order [order-ref] [config-path]
//! ```
//!
//! The order reference defaults to `FD-12345XYZ`. Without a configuration
//! file the demo preset (one-second ticks) is used; otherwise the TOML file
//! at `config-path` is loaded, for example:
//!
//! ```toml
//! tick_interval_ms = 2000
//! initial_stage = "PREPARING"
//! ```
//!
//! Each stage change is rendered as a text tracker through `tracing`. Set
//! `RUST_LOG=debug` to also see timer bookkeeping. The process exits once the
//! order is delivered, or on Ctrl+C.

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use ordertrack::config::{ConfigError, TrackingConfig};
use ordertrack::tracking::{
    adapters::{TemplateSnapshotRenderer, TokioTickScheduler, WatchSnapshotPublisher},
    domain::ProgressSnapshot,
    ports::{PublisherResult, SnapshotPublisher},
    services::{OrderTrackingService, TrackingError},
};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_ORDER_REF: &str = "FD-12345XYZ";
const USAGE: &str = "usage: track_order [order-ref] [config-path]";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum TrackOrderError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to listen for Ctrl+C: {0}")]
    Signal(#[source] std::io::Error),
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    order_ref: String,
    config_path: Option<Utf8PathBuf>,
}

/// Renders every snapshot and forwards it to the delivery watcher.
#[derive(Debug, Default)]
struct TerminalTracker {
    renderer: TemplateSnapshotRenderer,
    latest: WatchSnapshotPublisher,
}

impl SnapshotPublisher for TerminalTracker {
    fn publish(&self, snapshot: &ProgressSnapshot) -> PublisherResult<()> {
        self.latest.publish(snapshot)?;
        self.renderer.publish(snapshot)
    }
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    let args = collect_args()?;
    run(args.into_iter()).map_err(Into::into)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

fn collect_args() -> Result<Vec<String>, TrackOrderError> {
    env::args_os()
        .skip(1)
        .map(|arg_os| {
            arg_os
                .into_string()
                .map_err(|_| TrackOrderError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect()
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Invocation, TrackOrderError> {
    let order_ref = args.next().unwrap_or_else(|| DEFAULT_ORDER_REF.to_owned());
    let config_path = args.next().map(Utf8PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(TrackOrderError::InvalidArgs(format!(
            "unexpected argument '{extra}'; {USAGE}"
        )));
    }
    Ok(Invocation {
        order_ref,
        config_path,
    })
}

fn run(args: impl Iterator<Item = String>) -> Result<(), TrackOrderError> {
    let invocation = parse_args(args)?;
    let config = match &invocation.config_path {
        Some(path) => TrackingConfig::load(path)?,
        None => TrackingConfig::demo(),
    };
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(TrackOrderError::RuntimeInit)?;
    runtime.block_on(track(&invocation.order_ref, config))
}

async fn track(order_ref: &str, config: TrackingConfig) -> Result<(), TrackOrderError> {
    let scheduler = Arc::new(TokioTickScheduler::current().map_err(TrackingError::from)?);
    let tracker = Arc::new(TerminalTracker::default());
    let mut updates = tracker.latest.subscribe();
    let service = OrderTrackingService::new(config, scheduler, tracker, Arc::new(DefaultClock));

    let engine = service.open(order_ref)?;
    tracing::info!(
        order_ref,
        session_id = %engine.session_id(),
        interval = ?engine.tick_interval(),
        "tracking order"
    );

    tokio::select! {
        () = wait_for_delivery(&mut updates) => {
            tracing::info!(order_ref, "order delivered");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(TrackOrderError::Signal)?;
            tracing::info!("received Ctrl+C, shutting down");
        }
    }

    let closed = service.close_all()?;
    tracing::info!(closed, "tracking stopped");
    Ok(())
}

async fn wait_for_delivery(updates: &mut watch::Receiver<Option<ProgressSnapshot>>) {
    while updates.changed().await.is_ok() {
        if updates
            .borrow_and_update()
            .as_ref()
            .is_some_and(ProgressSnapshot::is_terminal)
        {
            return;
        }
    }
}
