//! Resilience patterns for the transport
//!
//! Currently a single pattern: retry with exponential backoff on transient
//! failures.

mod retry;

pub use retry::{RetryConfig, RetryExecutor};
