//! SaniTrack Data Model
//!
//! Defines the data contracts shared by the engine, the monitor loop, and
//! its collaborators:
//! - **Landmarks:** Hand skeletons produced by the landmark detector
//! - **Detections:** Labeled objects produced by the object detector
//! - **Status:** The snapshot a display renders every tick
//! - **Alerts:** The payload handed to an alert sink
//! - **Trace:** JSONL replay format for recorded or synthetic sessions
//!
//! Landmark coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame; motion samples derived from them are in frame pixels.

pub mod alert;
pub mod detection;
pub mod landmark;
pub mod status;
pub mod trace;

pub use alert::*;
pub use detection::*;
pub use landmark::*;
pub use status::*;
pub use trace::*;
