//! SaniTrack Monitor
//!
//! Drives the cleanliness engine from a stream of camera frames. The
//! detectors and the alert transport are collaborators behind traits:
//!
//! - **Frames:** [`FrameSource`] yields the frame handle for each tick
//! - **Hands:** [`HandLandmarkProvider`] returns hand skeletons for a frame
//! - **Objects:** [`ObjectDetector`] returns labeled detections for a frame
//! - **Alerts:** [`AlertSink`] delivers alert payloads, fire-and-forget
//!
//! Detector calls run as spawned tasks. Each detector has a single
//! in-flight slot, so at most one request per detector is outstanding and
//! results are applied in submission order.

pub mod monitor;
pub mod replay;
pub mod sinks;
pub mod slot;

use std::future::Future;
use std::pin::Pin;

use sanitrack_common::clock::SessionMs;
use sanitrack_common::error::SanitrackResult;
use sanitrack_model::alert::AlertPayload;
use sanitrack_model::detection::Detection;
use sanitrack_model::landmark::HandSkeleton;

pub use monitor::{Monitor, MonitorStats};

/// Future returned by collaborator calls.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = SanitrackResult<T>> + Send + 'static>>;

/// Handle to one captured frame. Pixel data stays with the collaborators;
/// the monitor only needs identity, capture time, and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index: u64,
    pub captured_at_ms: SessionMs,
    pub width: u32,
    pub height: u32,
}

/// Result of asking a frame source for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePoll {
    Frame(Frame),
    /// The camera has nothing yet; the tick runs without new detections.
    NotReady,
    /// The source is exhausted.
    Ended,
}

/// Camera acquisition.
pub trait FrameSource: Send {
    fn poll_frame(&mut self) -> FramePoll;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Hand-landmark detector.
pub trait HandLandmarkProvider: Send + Sync {
    /// Detect hands in a frame. Landmark 0 of each skeleton is the wrist.
    fn detect_hands(&self, frame: &Frame) -> BoxFuture<Vec<HandSkeleton>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Object-presence detector.
pub trait ObjectDetector: Send + Sync {
    fn detect_objects(&self, frame: &Frame) -> BoxFuture<Vec<Detection>>;

    /// Whether the underlying model has finished loading.
    fn is_ready(&self) -> bool;

    /// Detector name for logging.
    fn name(&self) -> &str;
}

/// Outbound alert delivery.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: AlertPayload) -> BoxFuture<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}
