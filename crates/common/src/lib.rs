//! SaniTrack Common Utilities
//!
//! Shared infrastructure for all SaniTrack crates:
//! - Error types and result aliases
//! - Session clock (monotonic milliseconds plus wall-clock anchoring)
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
