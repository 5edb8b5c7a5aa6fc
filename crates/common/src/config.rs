//! Application configuration.
//!
//! Every field has a default, so a config file only needs to name the
//! values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SanitrackError, SanitrackResult};

/// Highest supported tick rate; the loop period is whole milliseconds.
pub const MAX_TICK_HZ: u32 = 1000;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Wipe detection and cleanliness tracking.
    pub monitor: MonitorConfig,

    /// Alert debouncing and delivery.
    pub alert: AlertConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Wipe detection and cleanliness tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Number of wrist samples kept in the motion window.
    pub history_len: usize,

    /// Path length (frame pixels) the window must exceed to count as wiping.
    pub wipe_distance_threshold: f64,

    /// Consecutive wiping classifications needed to confirm a clean.
    pub wipe_confirmations: u32,

    /// How long the seat stays CLEAN after a confirmed wipe (ms).
    pub reset_timeout_ms: u64,

    /// Cleanliness score at session start.
    pub initial_score: u8,

    /// Score added by a confirmed wipe.
    pub wipe_bonus: u8,

    /// Score removed by a scan that finds objects.
    pub clutter_penalty: u8,

    /// Minimum time between object scans (ms).
    pub scan_interval_ms: u64,

    /// Frame width in pixels; normalized landmarks are scaled by it.
    pub frame_width: u32,

    /// Frame height in pixels.
    pub frame_height: u32,

    /// Maximum hands taken from a single landmark result.
    pub max_hands: usize,

    /// Tick rate of the monitoring loop (Hz).
    pub tick_hz: u32,
}

/// Alert debouncing and delivery parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Scores strictly below this raise alerts.
    pub cleanliness_threshold: u8,

    /// Minimum time between automatic alerts (ms).
    pub cooldown_ms: u64,

    /// How long the alert banner stays visible (ms).
    pub banner_ms: u64,

    /// Who the alert is addressed to.
    pub recipient: String,

    /// Append delivered alerts to this JSONL file instead of only logging them.
    pub log_file: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sanitrack_monitor=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_len: 5,
            wipe_distance_threshold: 50.0,
            wipe_confirmations: 3,
            reset_timeout_ms: 5_000,
            initial_score: 50,
            wipe_bonus: 20,
            clutter_penalty: 10,
            scan_interval_ms: 2_000,
            frame_width: 1280,
            frame_height: 720,
            max_hands: 1,
            tick_hz: 30,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cleanliness_threshold: 75,
            cooldown_ms: 3_600_000,
            banner_ms: 5_000,
            recipient: "facilities@localhost".to_string(),
            log_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> SanitrackResult<Self> {
        if !path.exists() {
            return Err(SanitrackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> SanitrackResult<()> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> SanitrackResult<()> {
        let m = &self.monitor;
        if m.history_len < 2 {
            return Err(SanitrackError::config(
                "monitor.history_len must be at least 2",
            ));
        }
        if m.wipe_confirmations == 0 {
            return Err(SanitrackError::config(
                "monitor.wipe_confirmations must be positive",
            ));
        }
        if m.tick_hz == 0 || m.tick_hz > MAX_TICK_HZ {
            return Err(SanitrackError::config(format!(
                "monitor.tick_hz must be within 1..={MAX_TICK_HZ}"
            )));
        }
        if !m.wipe_distance_threshold.is_finite() || m.wipe_distance_threshold < 0.0 {
            return Err(SanitrackError::config(
                "monitor.wipe_distance_threshold must be a finite, non-negative distance",
            ));
        }
        if m.scan_interval_ms == 0 {
            return Err(SanitrackError::config(
                "monitor.scan_interval_ms must be positive",
            ));
        }
        if m.frame_width == 0 || m.frame_height == 0 {
            return Err(SanitrackError::config(
                "monitor.frame_width and monitor.frame_height must be positive",
            ));
        }
        if m.initial_score > 100 {
            return Err(SanitrackError::config(
                "monitor.initial_score must be within 0..=100",
            ));
        }
        if self.alert.cleanliness_threshold > 100 {
            return Err(SanitrackError::config(
                "alert.cleanliness_threshold must be within 0..=100",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("sanitrack").join("config.json")
}
