//! SceneGen batch CLI.
//!
//! Stages the standard scene in a simulated editor world and runs a
//! capture session to completion, printing a summary of the sampling
//! outcomes.

use clap::Parser;
use scenegen_core::error::SceneError;
use scenegen_core::session::{Session, SessionConfig, SessionStats};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Virtual tick cadence of the drive loop (30 Hz).
const TICK: Duration = Duration::from_nanos(33_333_333);

/// SceneGen synthetic dataset batch driver
#[derive(Parser, Debug)]
#[command(name = "scenegen-sim")]
#[command(about = "Generate randomized capture sessions with ground truth records", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of frames to produce
    #[arg(short, long, default_value = "500")]
    frames: usize,

    /// Root directory for session outputs
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary output for pipeline parsing
    #[arg(long)]
    json: bool,
}

fn run(config: SessionConfig) -> Result<SessionStats, SceneError> {
    let mut host = scenegen_sim::editor_host();
    let stage = scenegen_sim::build_stage(&mut host, config.seed)?;
    let mut session = Session::new(stage, config)?;
    scenegen_sim::drive(&mut host, &mut session, TICK)
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    } else {
        args.seed
    };

    // One directory per session so reruns never clobber earlier outputs.
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let output_dir = args.out.join(format!("session_{}", stamp));

    let config = SessionConfig {
        seed,
        frames: args.frames,
        output_dir,
        ..SessionConfig::default()
    };
    let output_dir = config.output_dir.clone();

    if !args.json {
        info!("SceneGen batch driver v0.1.0");
        info!(seed, frames = args.frames, output = %output_dir.display(), "starting session");
    }

    let stats = match run(config) {
        Ok(stats) => stats,
        Err(e) => {
            error!("session failed: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats).unwrap());
    } else {
        info!(
            frames = stats.frames_completed,
            captures = stats.captures_requested,
            "session complete"
        );
        if stats.object_exhaustions > 0 || stats.camera_exhaustions > 0 {
            info!(
                object = stats.object_exhaustions,
                camera = stats.camera_exhaustions,
                "frames that ran out of sampling budget"
            );
        }
        info!("outputs in {}", output_dir.display());
    }
}
