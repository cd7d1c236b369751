//! FormCheck CLI: biomechanical analysis of exercise frames.
//!
//! Usage:
//!   formcheck analyze <FRAMES_DIR|REQUEST.json>   Analyze a batch of frames
//!   formcheck frame <PATH>                        Analyze a single frame
//!   formcheck config                              Show the effective configuration
//!   formcheck check                               Check model assets and workers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use formcheck_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "formcheck",
    about = "Biomechanical form analysis for strength-training exercises",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory containing pose-landmarker model assets
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a directory of frames or a JSON analysis request
    Analyze {
        /// Frames directory (*.jpg, *.png) or request file (*.json)
        input: PathBuf,

        /// Exercise type (squat, deadlift, bench-press, overhead-press, ...)
        #[arg(short, long)]
        exercise: Option<String>,

        /// Worker pool size for the CPU path
        #[arg(long)]
        workers: Option<usize>,

        /// Skip the accelerated path
        #[arg(long)]
        cpu_only: bool,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Analyze a single frame
    Frame {
        /// Path to the frame image
        path: PathBuf,

        /// Exercise type
        #[arg(short, long, default_value = "squat")]
        exercise: String,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Show the effective configuration
    Config,

    /// Check model assets and processing resources
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    formcheck_common::logging::init_logging(&config.logging);

    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }

    match cli.command {
        Commands::Analyze {
            input,
            exercise,
            workers,
            cpu_only,
            pretty,
        } => {
            if let Some(n) = workers {
                config.pipeline.workers = Some(n);
            }
            if cpu_only {
                config.detector.prefer_accelerated = false;
            }
            commands::analyze::run(config, input, exercise, pretty).await
        }
        Commands::Frame {
            path,
            exercise,
            pretty,
        } => commands::frame::run(config, path, exercise, pretty).await,
        Commands::Config => commands::config::run(&config),
        Commands::Check => commands::check::run(&config),
    }
}
