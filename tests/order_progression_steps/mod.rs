//! Step definitions for order progression scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
