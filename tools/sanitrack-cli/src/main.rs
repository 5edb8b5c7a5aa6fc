//! SaniTrack CLI: replay recorded sessions through the wipe monitor.
//!
//! Usage:
//!   sanitrack replay <TRACE>      Run a landmark trace through the monitor
//!   sanitrack simulate -o <FILE>  Write a synthetic wiping session
//!   sanitrack config              Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sanitrack_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "sanitrack",
    about = "Surface wipe monitoring from hand-landmark streams",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/sanitrack/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded trace through the monitor
    Replay {
        /// Path to the JSONL trace
        trace: PathBuf,

        /// Pace ticks in real time instead of following recorded timestamps
        #[arg(long)]
        realtime: bool,

        /// Append delivered alerts to this JSONL file
        #[arg(long)]
        alert_log: Option<PathBuf>,

        /// Print status changes as JSON lines
        #[arg(long)]
        json: bool,

        /// Send a manual report with the final state
        #[arg(long)]
        manual_report: bool,
    },

    /// Write a synthetic session trace
    Simulate {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Session length (seconds)
        #[arg(long, default_value = "12.0")]
        seconds: f64,

        /// Frames per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// When wiping starts (seconds)
        #[arg(long, default_value = "2.0")]
        wipe_start: f64,

        /// How long wiping lasts (seconds)
        #[arg(long, default_value = "1.5")]
        wipe_secs: f64,

        /// Objects on the surface from the start (comma-separated)
        #[arg(long, value_delimiter = ',')]
        objects: Vec<String>,

        /// When the objects are removed (seconds)
        #[arg(long)]
        clear_at: Option<f64>,
    },

    /// Show the effective configuration
    Config {
        /// Also write it to the standard config location
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let logging = sanitrack_common::logging::with_verbosity(&config.logging, cli.verbose);
    sanitrack_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            trace,
            realtime,
            alert_log,
            json,
            manual_report,
        } => {
            commands::replay::run(
                config,
                commands::replay::ReplayArgs {
                    trace,
                    realtime,
                    alert_log,
                    json,
                    manual_report,
                },
            )
            .await
        }
        Commands::Simulate {
            output,
            seconds,
            fps,
            wipe_start,
            wipe_secs,
            objects,
            clear_at,
        } => commands::simulate::run(
            output,
            commands::simulate::SessionPlan {
                seconds,
                fps,
                wipe_start,
                wipe_secs,
                objects,
                clear_at,
            },
        ),
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
