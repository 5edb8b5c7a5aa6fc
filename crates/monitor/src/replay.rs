//! Collaborators backed by a recorded trace.
//!
//! A [`ReplayTrace`] stands in for the camera and both detectors: frame
//! `i` of the replay is line `i` of the trace, the landmark provider
//! returns that line's hands, and the object detector returns the scene in
//! effect at that line.

use std::path::Path;
use std::sync::Arc;

use sanitrack_common::clock::{SessionClock, SessionMs};
use sanitrack_common::error::{SanitrackError, SanitrackResult};
use sanitrack_model::detection::Detection;
use sanitrack_model::landmark::HandSkeleton;
use sanitrack_model::status::StatusSnapshot;
use sanitrack_model::trace::{parse_trace, TraceFrame};

use crate::{
    BoxFuture, Frame, FramePoll, FrameSource, HandLandmarkProvider, Monitor, ObjectDetector,
};

/// A parsed trace plus the frame size its landmarks are scaled to.
#[derive(Debug, Clone)]
pub struct ReplayTrace {
    frames: Vec<TraceFrame>,
    width: u32,
    height: u32,
}

impl ReplayTrace {
    pub fn new(frames: Vec<TraceFrame>, width: u32, height: u32) -> Self {
        Self {
            frames,
            width,
            height,
        }
    }

    pub fn load(path: &Path, width: u32, height: u32) -> SanitrackResult<Self> {
        if !path.exists() {
            return Err(SanitrackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_trace(&content)?, width, height))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame handle for trace line `index`, stamped with its recorded time.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.frames.get(index).map(|f| Frame {
            index: index as u64,
            captured_at_ms: f.at_ms,
            width: self.width,
            height: self.height,
        })
    }

    /// Recorded time of the last frame.
    pub fn duration_ms(&self) -> SessionMs {
        self.frames.last().map_or(0, |f| f.at_ms)
    }

    fn hands_at(&self, index: u64) -> SanitrackResult<Vec<HandSkeleton>> {
        self.frames
            .get(index as usize)
            .map(|f| f.hands.clone())
            .ok_or_else(|| SanitrackError::detection(format!("no trace frame {index}")))
    }

    /// Objects in the scene at `index`: the most recent `objects` entry at
    /// or before it, or an empty scene.
    fn scene_at(&self, index: u64) -> SanitrackResult<Vec<Detection>> {
        let index = index as usize;
        let frame = self
            .frames
            .get(index)
            .ok_or_else(|| SanitrackError::detection(format!("no trace frame {index}")))?;
        if let Some(message) = &frame.scan_error {
            return Err(SanitrackError::detection(message.clone()));
        }

        let labels = self.frames[..=index]
            .iter()
            .rev()
            .find_map(|f| f.objects.as_ref())
            .cloned()
            .unwrap_or_default();
        Ok(labels.into_iter().map(Detection::new).collect())
    }
}

/// Landmark provider replaying a trace's hands.
pub struct ReplayLandmarks {
    trace: Arc<ReplayTrace>,
}

impl ReplayLandmarks {
    pub fn new(trace: Arc<ReplayTrace>) -> Self {
        Self { trace }
    }
}

impl HandLandmarkProvider for ReplayLandmarks {
    fn detect_hands(&self, frame: &Frame) -> BoxFuture<Vec<HandSkeleton>> {
        let result = self.trace.hands_at(frame.index);
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Object detector replaying a trace's scene.
pub struct ReplayObjects {
    trace: Arc<ReplayTrace>,
}

impl ReplayObjects {
    pub fn new(trace: Arc<ReplayTrace>) -> Self {
        Self { trace }
    }
}

impl ObjectDetector for ReplayObjects {
    fn detect_objects(&self, frame: &Frame) -> BoxFuture<Vec<Detection>> {
        let result = self.trace.scene_at(frame.index);
        Box::pin(async move { result })
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Frame source walking a trace once, for [`Monitor::run`].
///
/// Frames are stamped with the session clock so they line up with the
/// live tick times rather than the recorded ones.
pub struct ReplayFrames {
    trace: Arc<ReplayTrace>,
    clock: SessionClock,
    next: usize,
}

impl ReplayFrames {
    pub fn new(trace: Arc<ReplayTrace>, clock: SessionClock) -> Self {
        Self {
            trace,
            clock,
            next: 0,
        }
    }
}

impl FrameSource for ReplayFrames {
    fn poll_frame(&mut self) -> FramePoll {
        match self.trace.frame(self.next) {
            Some(mut frame) => {
                self.next += 1;
                frame.captured_at_ms = self.clock.now_ms();
                FramePoll::Frame(frame)
            }
            None => FramePoll::Ended,
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Replay a trace on its recorded timeline.
///
/// Each line becomes one tick at its recorded time, and detections are
/// awaited before the next line so the outcome is deterministic. Returns
/// every snapshot that differs from the one before it; the last entry is
/// the final state.
pub async fn replay_recorded(monitor: &mut Monitor, trace: &ReplayTrace) -> Vec<StatusSnapshot> {
    let mut changes: Vec<StatusSnapshot> = Vec::new();

    for index in 0..trace.len() {
        let Some(frame) = trace.frame(index) else {
            break;
        };
        monitor.tick(Some(frame), frame.captured_at_ms);
        let snapshot = monitor.settle().await;
        if changes.last().map_or(true, |prev| snapshot.differs_from(prev)) {
            changes.push(snapshot);
        }
    }

    changes
}
