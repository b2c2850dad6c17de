//! sightline — walking guidance for visually-impaired pedestrians.
//!
//! Samples a forward-facing camera, asks a vision-language service to
//! describe the path, and turns the reply into spoken and haptic guidance.
//!
//! # Usage
//!
//! ```bash
//! # Simulation mode: synthetic camera, scripted vision replies
//! cargo run --release -- --simulate
//!
//! # Against a real vision bridge
//! cargo run --release -- --endpoint http://localhost:9090/describe
//! ```
//!
//! # Environment Variables
//!
//! - `SIGHTLINE_CONFIG`: path to a guidance.toml config file
//! - `SIGHTLINE_ENDPOINT`: vision bridge endpoint URL
//! - `RUST_LOG`: logging level (default: info)

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sightline::{
    ConsoleHaptics, ConsoleSpeech, EngineEvent, FrameSource, GuidanceConfig, GuidanceEngine,
    HttpVisionClient, ScriptedVisionClient, SimulatedCamera, VisionQueryClient,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sightline")]
#[command(about = "Walking guidance for visually-impaired pedestrians")]
#[command(version)]
struct CliArgs {
    /// Vision bridge endpoint URL; when omitted, runs with scripted replies
    #[arg(long, env = "SIGHTLINE_ENDPOINT")]
    endpoint: Option<String>,

    /// Force simulation mode (synthetic camera, scripted vision replies)
    #[arg(long)]
    simulate: bool,

    /// Analysis interval override (milliseconds)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Sensitivity override: low | medium | high
    #[arg(long)]
    sensitivity: Option<String>,

    /// Path to a guidance.toml config file
    #[arg(long)]
    config: Option<String>,

    /// Run for this many seconds then stop; 0 = run until Ctrl-C
    #[arg(long, default_value = "0")]
    duration_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => GuidanceConfig::load_from_file(Path::new(path))?,
        None => GuidanceConfig::load(),
    };
    if let Some(ms) = args.interval_ms {
        config.engine.analysis_interval_ms = ms;
    }
    if let Some(sensitivity) = &args.sensitivity {
        config.engine.sensitivity = sensitivity.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.vision.endpoint = endpoint.clone();
    }

    let frames: Arc<dyn FrameSource> = Arc::new(SimulatedCamera::new());
    let vision: Arc<dyn VisionQueryClient> = if args.simulate || config.vision.endpoint.is_empty()
    {
        info!("No vision endpoint configured — running with scripted replies");
        Arc::new(ScriptedVisionClient::demo_script())
    } else {
        info!(endpoint = %config.vision.endpoint, "Using vision bridge");
        Arc::new(HttpVisionClient::new(
            &config.vision.endpoint,
            &config.vision.prompt,
            config.vision_request_timeout(),
        )?)
    };

    let engine = GuidanceEngine::new(
        frames,
        vision,
        Arc::new(ConsoleSpeech),
        Arc::new(ConsoleHaptics),
        &config,
    );

    // Observer task: renders updates the way a UI layer would.
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EngineEvent::StateChanged(state)) => {
                    info!(state = %state, "Engine state changed");
                }
                Ok(EngineEvent::SnapshotUpdated(snapshot)) => {
                    debug!(
                        status = %snapshot.path_status,
                        obstacles = snapshot.obstacles.len(),
                        "Snapshot updated"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped = skipped, "Observer lagged behind engine events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    engine.start().await?;

    if args.duration_secs > 0 {
        tokio::time::sleep(std::time::Duration::from_secs(args.duration_secs)).await;
    } else {
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
    }

    let _ = engine.stop();

    let stats = engine.stats();
    info!(
        ticks = stats.ticks,
        skipped = stats.skipped_ticks,
        failed = stats.failed_ticks,
        snapshots = stats.snapshots,
        "Final statistics"
    );
    Ok(())
}
