//! Alert sink implementations.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sanitrack_common::error::{SanitrackError, SanitrackResult};
use sanitrack_model::alert::AlertPayload;

use crate::{AlertSink, BoxFuture};

/// Reports alerts through `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn deliver(&self, alert: AlertPayload) -> BoxFuture<()> {
        Box::pin(async move {
            tracing::warn!(
                recipient = %alert.recipient,
                kind = ?alert.kind,
                score = alert.score,
                "Cleanliness alert: {}",
                alert.summary()
            );
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Appends each alert as one JSON line to a file.
///
/// The file is opened in append mode so alerts from earlier sessions are kept.
/// Every alert is flushed before delivery reports success.
pub struct JsonlAlertSink {
    writer: Arc<Mutex<BufWriter<File>>>,
    path: PathBuf,
}

impl JsonlAlertSink {
    pub fn open(path: impl AsRef<Path>) -> SanitrackResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlertSink for JsonlAlertSink {
    fn deliver(&self, alert: AlertPayload) -> BoxFuture<()> {
        let writer = Arc::clone(&self.writer);
        Box::pin(async move {
            let json = serde_json::to_string(&alert)?;
            let mut writer = writer
                .lock()
                .map_err(|_| SanitrackError::alert_delivery("alert log writer poisoned"))?;
            writeln!(writer, "{json}")
                .and_then(|_| writer.flush())
                .map_err(|e| SanitrackError::alert_delivery(format!("Failed to write alert: {e}")))?;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanitrack_model::alert::AlertKind;
    use sanitrack_model::status::CleanStatus;

    fn alert(score: u8) -> AlertPayload {
        AlertPayload {
            kind: AlertKind::Automatic,
            score,
            objects: vec!["cup".into()],
            status: CleanStatus::NeedsCleaning,
            last_cleaned: "Never".into(),
            recipient: "ward@example.org".into(),
            sent_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_log_sink_always_succeeds() {
        assert!(LogAlertSink.deliver(alert(10)).await.is_ok());
    }

    #[tokio::test]
    async fn test_jsonl_sink_appends_lines() {
        let dir = std::env::temp_dir().join("sanitrack_jsonl_sink_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("alerts.jsonl");

        let sink = JsonlAlertSink::open(&path).unwrap();
        sink.deliver(alert(40)).await.unwrap();
        sink.deliver(alert(30)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<AlertPayload> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].score, 40);
        assert_eq!(lines[1].score, 30);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
