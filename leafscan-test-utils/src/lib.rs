//! Test utilities for the LeafScan client
//!
//! This crate provides a mock transport, a controllable clock, and test
//! data builders for testing store behavior without a live prediction
//! service.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::test_data;
pub use mocks::{ManualClock, MockTransport};
