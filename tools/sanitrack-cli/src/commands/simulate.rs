//! Synthetic session traces.
//!
//! The wrist rests near the center of the frame with sub-pixel jitter, then
//! sweeps side to side while wiping, then rests again.

use std::f64::consts::TAU;
use std::path::PathBuf;

use sanitrack_model::landmark::HandSkeleton;
use sanitrack_model::trace::{to_jsonl, TraceFrame};

/// Horizontal sweep amplitude while wiping (normalized).
const SWEEP_AMPLITUDE: f64 = 0.08;
/// Sweeps per second while wiping.
const SWEEP_HZ: f64 = 2.0;
/// Resting jitter amplitude (normalized).
const REST_JITTER: f64 = 0.0008;

/// What to synthesize.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub seconds: f64,
    pub fps: u32,
    pub wipe_start: f64,
    pub wipe_secs: f64,
    pub objects: Vec<String>,
    pub clear_at: Option<f64>,
}

pub fn run(output: PathBuf, plan: SessionPlan) -> anyhow::Result<()> {
    let frames = synthesize(&plan)?;
    let header = format!(
        "synthetic session: {:.1}s at {} fps, wiping {:.1}s-{:.1}s",
        plan.seconds,
        plan.fps,
        plan.wipe_start,
        plan.wipe_start + plan.wipe_secs
    );
    let content = to_jsonl(&frames, Some(&header))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output, content)?;

    println!("Wrote {} frames to: {}", frames.len(), output.display());
    Ok(())
}

pub fn synthesize(plan: &SessionPlan) -> anyhow::Result<Vec<TraceFrame>> {
    if plan.fps == 0 {
        anyhow::bail!("fps must be positive");
    }
    if plan.seconds <= 0.0 {
        anyhow::bail!("session length must be positive");
    }

    let frame_count = (plan.seconds * plan.fps as f64).round() as u64;
    let wipe_end = plan.wipe_start + plan.wipe_secs;
    let mut cleared = false;

    let frames = (0..frame_count)
        .map(|i| {
            let at_ms = i * 1000 / plan.fps as u64;
            let t = at_ms as f64 / 1000.0;

            let (x, y) = if t >= plan.wipe_start && t < wipe_end {
                let phase = TAU * SWEEP_HZ * (t - plan.wipe_start);
                (
                    0.5 + SWEEP_AMPLITUDE * phase.sin(),
                    0.55 + 0.01 * (2.0 * phase).sin(),
                )
            } else {
                (0.5 + REST_JITTER * (t * 7.0).sin(), 0.55)
            };

            let mut frame = TraceFrame::new(at_ms).with_hand(HandSkeleton::at_wrist(x, y));
            if i == 0 && !plan.objects.is_empty() {
                frame = frame.with_objects(plan.objects.iter().cloned());
            }
            if let Some(clear_at) = plan.clear_at {
                if !cleared && t >= clear_at {
                    frame = frame.with_objects(Vec::<String>::new());
                    cleared = true;
                }
            }
            frame
        })
        .collect();

    Ok(frames)
}
