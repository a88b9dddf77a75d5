//! Ordertrack: timed order-status progression.
//!
//! This crate drives a placed order through its delivery lifecycle
//! (confirmed, preparing, out for delivery, delivered) on a fixed timer and
//! publishes a tracker snapshot after every stage change.
//!
//! # Architecture
//!
//! Ordertrack follows hexagonal architecture principles:
//!
//! - **Domain**: Stages, progression state and snapshots with no
//!   infrastructure dependencies
//! - **Ports**: Trait interfaces for timers and snapshot delivery
//! - **Adapters**: Tokio, in-memory, watch-channel, tracing and template
//!   implementations of the ports
//!
//! # Modules
//!
//! - [`config`]: Tracking configuration and TOML loading
//! - [`tracking`]: Progression engine, sessions and the tracking service

pub mod config;
pub mod tracking;
