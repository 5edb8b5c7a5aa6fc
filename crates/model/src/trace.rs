//! Replay trace format.
//!
//! A trace is JSON Lines: one [`TraceFrame`] per line. Lines starting with
//! `#` and blank lines are skipped, so a trace may carry a commented header.

use serde::{Deserialize, Serialize};

use sanitrack_common::clock::SessionMs;
use sanitrack_common::error::{SanitrackError, SanitrackResult};

use crate::landmark::HandSkeleton;

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// Session time of the frame (ms).
    #[serde(rename = "t")]
    pub at_ms: SessionMs,

    /// Hands visible in the frame.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hands: Vec<HandSkeleton>,

    /// Objects in the scene from this frame on. `None` keeps the previous scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<String>>,

    /// When set, an object scan of this frame fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
}

impl TraceFrame {
    pub fn new(at_ms: SessionMs) -> Self {
        Self {
            at_ms,
            hands: Vec::new(),
            objects: None,
            scan_error: None,
        }
    }

    pub fn with_hand(mut self, hand: HandSkeleton) -> Self {
        self.hands.push(hand);
        self
    }

    pub fn with_objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects = Some(objects.into_iter().map(Into::into).collect());
        self
    }
}

/// Parse a JSONL trace. Frames must not go back in time.
pub fn parse_trace(content: &str) -> SanitrackResult<Vec<TraceFrame>> {
    let mut frames: Vec<TraceFrame> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line_no = idx + 1;
        let frame: TraceFrame = serde_json::from_str(trimmed)
            .map_err(|e| SanitrackError::trace(line_no, e.to_string()))?;

        if let Some(prev) = frames.last() {
            if frame.at_ms < prev.at_ms {
                return Err(SanitrackError::trace(
                    line_no,
                    format!("timestamp {} is before {}", frame.at_ms, prev.at_ms),
                ));
            }
        }
        frames.push(frame);
    }

    Ok(frames)
}

/// Serialize frames to JSONL, preceded by an optional `#` header line.
pub fn to_jsonl(frames: &[TraceFrame], header: Option<&str>) -> SanitrackResult<String> {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str("# ");
        out.push_str(header);
        out.push('\n');
    }
    for frame in frames {
        out.push_str(&serde_json::to_string(frame)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# synthetic\n\n{\"t\":0}\n{\"t\":33,\"hands\":[[{\"x\":0.5,\"y\":0.5}]],\"objects\":[\"cup\"]}\n";
        let frames = parse_trace(content).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].hands.is_empty());
        assert!(frames[0].objects.is_none());
        assert_eq!(frames[1].hands[0].wrist().unwrap().x, 0.5);
        assert_eq!(frames[1].objects.as_deref(), Some(&["cup".to_string()][..]));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = "{\"t\":0}\n# note\nnot json\n";
        let err = parse_trace(content).unwrap_err();
        assert!(matches!(err, SanitrackError::Trace { line: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_time_going_backwards() {
        let content = "{\"t\":100}\n{\"t\":50}\n";
        let err = parse_trace(content).unwrap_err();
        assert!(matches!(err, SanitrackError::Trace { line: 2, .. }));
    }

    #[test]
    fn test_jsonl_output_parses_back() {
        let frames = vec![
            TraceFrame::new(0).with_objects(["bottle"]),
            TraceFrame::new(33).with_hand(HandSkeleton::at_wrist(0.2, 0.3)),
        ];
        let text = to_jsonl(&frames, Some("generated")).unwrap();
        assert!(text.starts_with("# generated\n"));
        assert_eq!(parse_trace(&text).unwrap(), frames);
    }
}
