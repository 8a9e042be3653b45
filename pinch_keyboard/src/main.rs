//! pinch_keyboard — interactive entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use pinch_keyboard::app::{run, AppConfig, DetectorKind, SourceKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg { Synthetic, Camera }

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DetectorArg { Sim, Mediapipe }

/// Type on a virtual keyboard by pinching over the keys.
#[derive(Debug, Parser)]
#[command(name = "pinch_keyboard", version, about)]
struct Cli {
    /// Frame source (defaults to the camera when built with `--features camera`)
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Camera device index
    #[arg(long, default_value_t = 0)]
    camera_index: u32,

    /// Hand landmark source
    #[arg(long, value_enum, default_value_t = DetectorArg::Sim)]
    detector: DetectorArg,

    /// MediaPipe helper script (defaults to the one shipped with the crate)
    #[arg(long)]
    detector_script: Option<PathBuf>,

    /// Interpreter used to run the helper script
    #[arg(long, default_value = "python3")]
    python: String,

    /// Pinch distance in pixels below which a hovered key is typed
    #[arg(long, default_value_t = 30.0)]
    click_threshold: f32,

    /// Per-key cooldown after a click, in milliseconds
    #[arg(long, default_value_t = 300)]
    cooldown_ms: u64,

    /// Log filter when RUST_LOG is not set (e.g. "debug", "pinch_keyboard=trace")
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn config_from(cli: &Cli) -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Some(source) = cli.source {
        cfg.source = match source {
            SourceArg::Synthetic => SourceKind::Synthetic,
            SourceArg::Camera    => SourceKind::Camera,
        };
    }
    cfg.camera_index = cli.camera_index;
    cfg.detector = match cli.detector {
        DetectorArg::Sim       => DetectorKind::Simulated,
        DetectorArg::Mediapipe => DetectorKind::MediaPipe,
    };
    if let Some(script) = &cli.detector_script {
        cfg.mediapipe.script = script.clone();
    }
    cfg.mediapipe.program = cli.python.clone();
    cfg.click_threshold   = cli.click_threshold;
    cfg.cooldown          = Duration::from_millis(cli.cooldown_ms);
    cfg
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cfg = config_from(&cli);
    tracing::info!(
        source = ?cfg.source,
        detector = ?cfg.detector,
        threshold = cfg.click_threshold,
        cooldown_ms = cli.cooldown_ms,
        "starting virtual keyboard"
    );

    let typed = run(cfg).context("virtual keyboard stopped")?;
    println!("Typed Text: {}", typed);
    Ok(())
}
