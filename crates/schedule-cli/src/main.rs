//! `schedule` CLI: resolve a clinician's schedule from a JSON row snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Day schedule (blocks, appointments, slot grid) from a snapshot file
//! schedule day --clinician c1 --date 2024-06-04 --timezone America/New_York -i rows.json
//!
//! # Per-date summary for an explicit range (snapshot on stdin)
//! cat rows.json | schedule summary --clinician c1 --from 2024-06-01 --to 2024-06-30
//!
//! # Week or month containing a date
//! schedule week --clinician c1 --date 2024-06-04 -i rows.json
//! schedule month --clinician c1 --date 2024-06-04 -i rows.json -o june.json
//! ```
//!
//! The snapshot is `{"rules": [...], "exceptions": [...], "single_dates": [...],
//! "appointments": [...]}`. Engine settings come from `SCHEDULE_*` environment
//! variables; logs go to stderr and are filtered by `RUST_LOG` (default `warn`).

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use schedule_engine::model::DateRange;
use schedule_engine::{EngineConfig, InMemoryStore, ScheduleService};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Resolve clinician availability and appointments into render-ready schedules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot JSON file (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long, global = true)]
    output: Option<String>,
}

#[derive(Args)]
struct Target {
    /// Clinician whose rows to resolve
    #[arg(long)]
    clinician: String,

    /// IANA timezone of the clinician (falls back to SCHEDULE_DEFAULT_TIMEZONE)
    #[arg(long)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detailed schedule for one date: blocks, appointments, and slots
    Day {
        #[command(flatten)]
        target: Target,
        /// Date to resolve (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Per-date availability summary over an inclusive date range
    Summary {
        #[command(flatten)]
        target: Target,
        /// First date of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last date of the range (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Summary of the week containing a date
    Week {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Summary of the calendar month containing a date
    Month {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::from_env();
    config.validate().context("Invalid engine configuration")?;

    let json = read_input(cli.input.as_deref())?;
    let store = InMemoryStore::from_json(&json).context("Failed to parse schedule snapshot")?;
    let service = ScheduleService::new(store, config);

    let rendered = match cli.command {
        Commands::Day { target, date } => {
            let tz = timezone_arg(&target, service.config());
            let schedule = service
                .day_schedule(&target.clinician, date, &tz)
                .await
                .context("Failed to resolve day schedule")?;
            serde_json::to_string_pretty(&schedule)?
        }
        Commands::Summary { target, from, to } => {
            let range = DateRange::new(from, to).context("Invalid --from/--to range")?;
            let tz = timezone_arg(&target, service.config());
            let summary = service
                .range_summary(&target.clinician, &range, &tz)
                .await
                .context("Failed to resolve range summary")?;
            serde_json::to_string_pretty(&summary)?
        }
        Commands::Week { target, date } => {
            let tz = timezone_arg(&target, service.config());
            let summary = service
                .week_summary(&target.clinician, date, &tz)
                .await
                .context("Failed to resolve week summary")?;
            serde_json::to_string_pretty(&summary)?
        }
        Commands::Month { target, date } => {
            let tz = timezone_arg(&target, service.config());
            let summary = service
                .month_summary(&target.clinician, date, &tz)
                .await
                .context("Failed to resolve month summary")?;
            serde_json::to_string_pretty(&summary)?
        }
    };

    write_output(cli.output.as_deref(), &rendered)
}

fn timezone_arg(target: &Target, config: &EngineConfig) -> String {
    target
        .timezone
        .clone()
        .unwrap_or_else(|| config.default_timezone.name().to_string())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
