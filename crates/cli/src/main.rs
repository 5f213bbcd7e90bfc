//! Racetrack CLI - terminal race simulation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use racetrack_core::{ProgressSnapshot, RaceConfig};
use racetrack_progress::{Participant, RaceRunner};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "racetrack")]
#[command(about = "Race simulation driven by resumable progress counters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Race file (JSON); defaults to a two-player race
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the race until every participant finishes
    Run {
        /// Pause all participants after this many milliseconds
        #[arg(long)]
        pause_after_ms: Option<u64>,
        /// How long to stay paused before resuming
        #[arg(long, default_value = "1000")]
        resume_after_ms: u64,
        /// Render interval in milliseconds
        #[arg(long, default_value = "250")]
        refresh_ms: u64,
        /// Print JSON snapshots instead of progress bars
        #[arg(long)]
        json: bool,
    },
    /// Show the validated race configuration
    Show,
}

/// Where the race is in its pause/resume schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Racing,
    Paused,
    Resumed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let race = load_race(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            pause_after_ms,
            resume_after_ms,
            refresh_ms,
            json,
        } => {
            let schedule = pause_after_ms.map(|pause| {
                (
                    Duration::from_millis(pause),
                    Duration::from_millis(pause.saturating_add(resume_after_ms)),
                )
            });
            run_race(race, schedule, Duration::from_millis(refresh_ms.max(1)), json).await?;
        }
        Commands::Show => {
            println!("{}", serde_json::to_string_pretty(&race)?);
        }
    }

    Ok(())
}

fn load_race(path: Option<&Path>) -> Result<RaceConfig> {
    let race = match path {
        Some(path) => {
            info!("Loading race from {}", path.display());
            RaceConfig::load(path)?
        }
        None => RaceConfig::default(),
    };
    Ok(race)
}

async fn run_race(
    race: RaceConfig,
    schedule: Option<(Duration, Duration)>,
    refresh: Duration,
    json: bool,
) -> Result<()> {
    let mut runners = race
        .participants
        .into_iter()
        .map(|config| Participant::new(config).map(RaceRunner::new))
        .collect::<Result<Vec<_>, _>>()?;

    for runner in &mut runners {
        runner.start();
    }

    let started = Instant::now();
    let mut phase = Phase::Racing;
    let mut ticker = tokio::time::interval(refresh);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                for runner in &mut runners {
                    runner.pause().await;
                }
                info!("Race interrupted");
                render(&runners, json)?;
                return Ok(());
            }
        }

        if let Some((pause_at, resume_at)) = schedule {
            let elapsed = started.elapsed();
            if phase == Phase::Racing && elapsed >= pause_at {
                for runner in &mut runners {
                    runner.pause().await;
                }
                phase = Phase::Paused;
                info!("Race paused");
            } else if phase == Phase::Paused && elapsed >= resume_at {
                for runner in &mut runners {
                    runner.resume();
                }
                phase = Phase::Resumed;
                info!("Race resumed");
            }
        }

        render(&runners, json)?;

        if runners.iter().all(|runner| runner.participant().is_finished()) {
            break;
        }
    }

    info!("All participants finished in {:?}", started.elapsed());
    Ok(())
}

fn render(runners: &[RaceRunner], json: bool) -> Result<()> {
    let snapshots: Vec<ProgressSnapshot> = runners
        .iter()
        .map(|runner| runner.participant().snapshot())
        .collect();

    if json {
        println!("{}", serde_json::to_string(&snapshots)?);
        return Ok(());
    }

    for snapshot in &snapshots {
        println!("{}", format_bar(snapshot));
    }
    println!();
    Ok(())
}

fn format_bar(snapshot: &ProgressSnapshot) -> String {
    let filled = (snapshot.progress_factor.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!(
        "{:<12} [{}{}] {}/{} ({:.0}%)",
        snapshot.name,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        snapshot.current_progress,
        snapshot.max_progress,
        snapshot.percentage(),
    )
}
