// SYNOID Hype Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use synoid_hype::config::{CandidateMode, EngineConfig};
use synoid_hype::engine::signals::Session;
use synoid_hype::engine::{self, VirtualInterval};
use synoid_hype::render::ReelRenderer;
use synoid_hype::CutPlan;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "synoid-hype")]
#[command(about = "SYNOID Hype Mixer: score long sessions and plan a highlight reel")]
#[command(long_about = None)]
struct Cli {
    /// Config file (defaults: $SYNOID_HYPE_CONFIG, ./hype_config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Default)]
struct Overrides {
    /// Total reel length in seconds
    #[arg(long)]
    budget: Option<f64>,

    /// Window width in seconds
    #[arg(long)]
    window: Option<f64>,

    /// Clip length in seconds (grid and peaks modes)
    #[arg(long)]
    clip_length: Option<f64>,

    /// Candidate mode: window, grid or peaks
    #[arg(long)]
    mode: Option<String>,

    /// Number of peaks kept before suppression (peaks mode)
    #[arg(long)]
    top_k: Option<usize>,

    /// Peaks kept per source instead of across the whole session (peaks mode)
    #[arg(long)]
    per_source_peaks: Option<usize>,

    /// Use five-minute chunk scoring instead of the configured windows
    #[arg(long)]
    chunked: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a cut plan from a session file of sources and raw signals
    Plan {
        /// Session JSON: {"sources": [{"id", "duration_seconds", "signals": [...]}]}
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the plan (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include diagnostics next to the plan
        #[arg(long)]
        diagnostics: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the per-window hype scores of a session
    Score {
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Select from pre-scored intervals on the concatenated timeline
    Select {
        /// Session JSON (signals may be omitted)
        #[arg(short, long)]
        sources: PathBuf,

        /// JSON array of {"start", "end", "score"}
        #[arg(long)]
        intervals: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Cut and concatenate a plan with FFmpeg
    Render {
        /// Cut plan JSON produced by `plan`
        #[arg(short, long)]
        plan: PathBuf,

        /// Session JSON carrying each source's media_path
        #[arg(short, long)]
        sources: PathBuf,

        /// Output video path
        #[arg(short, long)]
        output: PathBuf,

        /// Scratch directory for the cut parts
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            output,
            diagnostics,
            overrides,
        } => {
            let config = resolve_config(cli.config.as_deref(), &overrides)?;
            let session = read_json::<Session>(&input)?;
            let outcome = engine::build_cut_plan(&session.sources, &config);

            for issue in &outcome.diagnostics.issues {
                warn!("[HYPE] {:?}", issue);
            }
            if outcome.plan.is_empty() {
                warn!("[HYPE] No highlights found in {:?}", input);
            }
            info!(
                "[HYPE] Plan: {} segment(s), {:.1}s",
                outcome.plan.len(),
                outcome.plan.total_duration()
            );

            if diagnostics {
                write_json(&outcome, output.as_deref())?;
            } else {
                write_json(&outcome.plan, output.as_deref())?;
            }
        }
        Commands::Score { input, overrides } => {
            let config = resolve_config(cli.config.as_deref(), &overrides)?;
            let session = read_json::<Session>(&input)?;
            let (_, scored) = engine::score_windows(&session.sources, &config);
            write_json(&scored, None)?;
        }
        Commands::Select {
            sources,
            intervals,
            output,
            overrides,
        } => {
            let config = resolve_config(cli.config.as_deref(), &overrides)?;
            let session = read_json::<Session>(&sources)?;
            let intervals = read_json::<Vec<VirtualInterval>>(&intervals)?;
            let descriptors: Vec<_> = session.sources.into_iter().map(|s| s.source).collect();
            let outcome = engine::select_intervals(&descriptors, &intervals, &config);
            write_json(&outcome.plan, output.as_deref())?;
        }
        Commands::Render {
            plan,
            sources,
            output,
            work_dir,
        } => {
            let plan = read_json::<CutPlan>(&plan)?;
            let session = read_json::<Session>(&sources)?;
            let descriptors: Vec<_> = session.sources.into_iter().map(|s| s.source).collect();
            let work_dir = work_dir.unwrap_or_else(std::env::temp_dir);
            let summary = ReelRenderer::new(work_dir)
                .render(&plan, &descriptors, &output)
                .await?;
            println!(
                "Reel saved: {:?} ({} segments, {:.1}s, {:.2} MB)",
                summary.output_path, summary.segments, summary.seconds, summary.size_mb
            );
        }
    }

    Ok(())
}

fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<EngineConfig> {
    let mut config = if overrides.chunked {
        EngineConfig::chunked()
    } else {
        EngineConfig::load(path)?
    };
    if let Some(budget) = overrides.budget {
        config.budget_seconds = budget;
    }
    if let Some(window) = overrides.window {
        config.window_width_seconds = window;
    }
    if let Some(clip) = overrides.clip_length {
        config.clip_length_seconds = clip;
    }
    if let Some(top_k) = overrides.top_k {
        config.top_k = top_k;
    }
    if overrides.per_source_peaks.is_some() {
        config.top_k_per_source = overrides.per_source_peaks;
    }
    if let Some(mode) = &overrides.mode {
        config.candidate_mode = match mode.to_lowercase().as_str() {
            "window" => CandidateMode::Window,
            "grid" => CandidateMode::Grid,
            "peaks" | "peak" => CandidateMode::Peaks,
            other => bail!("Unknown candidate mode '{}'. Available: window, grid, peaks", other),
        };
    }
    config.validate()?;
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            info!("[HYPE] Wrote {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
