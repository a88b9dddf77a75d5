//! Unit tests for order progression tracking.
