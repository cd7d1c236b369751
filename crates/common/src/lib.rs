//! FormCheck Common Utilities
//!
//! Shared infrastructure for all FormCheck crates:
//! - Error types and result aliases
//! - Timing utilities for request/batch accounting
//! - Tracing/logging initialization
//! - Configuration loading and deployment profiles

pub mod config;
pub mod error;
pub mod logging;
pub mod timing;

pub use config::*;
pub use error::*;
pub use timing::*;
