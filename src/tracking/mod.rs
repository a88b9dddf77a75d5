//! Order progression tracking.
//!
//! Models the four-stage delivery lifecycle of a placed order and advances
//! it on a fixed timer until delivery, publishing a snapshot for the
//! tracker view after every change. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
