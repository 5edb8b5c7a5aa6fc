//! Run a recorded trace through the monitor.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sanitrack_common::clock::SessionClock;
use sanitrack_common::config::{AlertConfig, AppConfig};
use sanitrack_model::status::{ScoreLevel, StatusSnapshot};
use sanitrack_monitor::replay::{
    replay_recorded, ReplayFrames, ReplayLandmarks, ReplayObjects, ReplayTrace,
};
use sanitrack_monitor::sinks::{JsonlAlertSink, LogAlertSink};
use sanitrack_monitor::{AlertSink, Monitor};

pub struct ReplayArgs {
    pub trace: PathBuf,
    pub realtime: bool,
    pub alert_log: Option<PathBuf>,
    pub json: bool,
    pub manual_report: bool,
}

pub async fn run(mut config: AppConfig, args: ReplayArgs) -> anyhow::Result<()> {
    if let Some(path) = args.alert_log {
        config.alert.log_file = Some(path);
    }

    let trace = ReplayTrace::load(
        &args.trace,
        config.monitor.frame_width,
        config.monitor.frame_height,
    )
    .map_err(|e| anyhow::anyhow!("Failed to load trace: {e}"))?;
    let trace = Arc::new(trace);

    if !args.json {
        println!("Replaying: {}", args.trace.display());
        println!(
            "  {} frames, {:.1}s recorded",
            trace.len(),
            trace.duration_ms() as f64 / 1000.0
        );
    }

    let clock = SessionClock::start();
    let mut monitor = Monitor::new(
        &config,
        clock.clone(),
        Box::new(ReplayLandmarks::new(Arc::clone(&trace))),
        Box::new(ReplayObjects::new(Arc::clone(&trace))),
        build_sink(&config.alert)?,
    );

    let threshold = config.alert.cleanliness_threshold;
    let report = |snapshot: &StatusSnapshot| -> anyhow::Result<()> {
        if args.json {
            println!("{}", serde_json::to_string(snapshot)?);
        } else {
            println!("  {}", status_line(snapshot, &clock, threshold));
        }
        Ok(())
    };

    let last = if args.realtime {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_on_signal = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop_on_signal.store(true, Ordering::SeqCst);
            }
        });

        let mut frames = ReplayFrames::new(Arc::clone(&trace), clock.clone());
        let mut failure = None;
        let last = monitor
            .run(&mut frames, stop, |snapshot| {
                if failure.is_none() {
                    failure = report(snapshot).err();
                }
            })
            .await;
        if let Some(e) = failure {
            return Err(e);
        }
        last
    } else {
        let changes = replay_recorded(&mut monitor, &trace).await;
        for snapshot in &changes {
            report(snapshot)?;
        }
        match changes.last() {
            Some(last) => last.clone(),
            None => monitor.settle().await,
        }
    };

    if args.manual_report {
        monitor.send_manual_report(last.at_ms);
        monitor.settle().await;
    }

    if !args.json {
        let stats = monitor.stats();
        println!();
        println!("Final: {}", status_line(&last, &clock, threshold));
        println!(
            "  ticks={} landmark_results={} scans={} detection_failures={} alerts={} delivery_failures={}",
            stats.ticks,
            stats.landmark_results,
            stats.scans_applied,
            stats.detection_failures,
            stats.alerts_dispatched,
            stats.delivery_failures
        );
    }

    Ok(())
}

fn build_sink(config: &AlertConfig) -> anyhow::Result<Arc<dyn AlertSink>> {
    match &config.log_file {
        Some(path) => {
            let sink = JsonlAlertSink::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open alert log {}: {e}", path.display()))?;
            tracing::info!(path = %sink.path().display(), "Writing alerts to file");
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(LogAlertSink)),
    }
}

fn status_line(snapshot: &StatusSnapshot, clock: &SessionClock, threshold: u8) -> String {
    let level = match ScoreLevel::for_score(snapshot.score, threshold) {
        ScoreLevel::Good => "ok",
        ScoreLevel::Poor => "low",
    };
    let objects = if snapshot.objects.is_empty() {
        "none".to_string()
    } else {
        snapshot.objects.join(", ")
    };
    let banner = if snapshot.banner_visible { "  [ALERT]" } else { "" };

    format!(
        "[{:>8.3}s] {:<14} score {:>3}% ({level})  last cleaned {}  objects: {objects}{banner}",
        snapshot.at_ms as f64 / 1000.0,
        snapshot.status.label(),
        snapshot.score,
        clock.describe(snapshot.last_cleaned_at_ms),
    )
}
