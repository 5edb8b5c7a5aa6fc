//! SaniTrack Wipe Core
//!
//! Turns per-frame hand and object detections into cleanliness decisions:
//! - **Motion History:** Rolling window of recent wrist positions
//! - **Wipe Classifier:** Path length over the window vs. a threshold
//! - **Cleanliness Machine:** Score, clean/dirty status, confirmation
//!   counter, and the clean timeout
//! - **Alert Debouncer:** Low-score alerts with a cooldown, plus the banner
//! - **Scan Scheduler:** Interval gate for object-presence re-checks
//!
//! This crate is pure computation: no I/O, no clocks, no async. Every
//! operation takes the current session time as an argument.

pub mod alert_debounce;
pub mod cleanliness;
pub mod engine;
pub mod motion_history;
pub mod scan_schedule;
pub mod wipe_classifier;

pub use alert_debounce::{AlertBanner, AlertDebouncer};
pub use cleanliness::{CleanlinessMachine, CleanlinessState, Transition};
pub use engine::CleanlinessEngine;
pub use motion_history::MotionHistory;
pub use scan_schedule::ScanScheduler;
pub use wipe_classifier::{WipeClassifier, WipeSignal};
