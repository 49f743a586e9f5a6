//! `vest` CLI -- parse vesting schedules and compute vesting facts from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Normalize a free-text schedule
//! vest parse "4 year / 1 year cliff"
//!
//! # Vesting facts for one grant as of a date
//! vest compute --shares 1000000 --start 2025-01-01 \
//!   --schedule "4 year / 1 year cliff" --as-of 2027-01-01
//!
//! # Every vesting event of a grant
//! vest timeline --shares 48000 --start 2025-01-01
//!
//! # Batch report from a JSON array of grant rows (stdin → stdout)
//! cat grants.json | vest report --as-of 2027-01-01
//!
//! # Fail when any row has an invalid share count or start date
//! vest report -i grants.json -o report.json --strict
//! ```
//!
//! Everything is printed as JSON on stdout. Schedule fallbacks are logged as
//! warnings on stderr; `-v` adds debug output and `RUST_LOG` overrides both.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use vesting_engine::{parse_date, parse_schedule, parse_schedule_detailed, GrantRecord};

#[derive(Parser)]
#[command(name = "vest", version, about = "Equity vesting calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a free-text schedule into duration and cliff months
    Parse {
        /// Schedule text, e.g. "4 year / 1 year cliff" (default schedule if omitted)
        text: Option<String>,
    },
    /// Compute vesting facts for one grant
    Compute {
        /// Total shares in the grant
        #[arg(long)]
        shares: u64,
        /// Grant start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Schedule text (defaults to 4 year / 1 year cliff)
        #[arg(long)]
        schedule: Option<String>,
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// List every vesting event of one grant
    Timeline {
        /// Total shares in the grant
        #[arg(long)]
        shares: u64,
        /// Grant start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Schedule text (defaults to 4 year / 1 year cliff)
        #[arg(long)]
        schedule: Option<String>,
    },
    /// Compute vesting facts for a JSON array of grant rows
    Report {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
        /// Exit with an error if any row failed validation
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { text } => {
            let parsed = parse_schedule_detailed(text.as_deref());
            print_json(&parsed)?;
        }
        Commands::Compute {
            shares,
            start,
            schedule,
            as_of,
        } => {
            let start = parse_date(&start).context("Invalid --start")?;
            let now = resolve_as_of(as_of.as_deref())?;
            let schedule = parse_schedule(schedule.as_deref());
            let facts = vesting_engine::compute_vesting(shares, start, &schedule, now)
                .context("Failed to compute vesting")?;
            print_json(&facts)?;
        }
        Commands::Timeline {
            shares,
            start,
            schedule,
        } => {
            let start = parse_date(&start).context("Invalid --start")?;
            let schedule = parse_schedule(schedule.as_deref());
            let events = vesting_engine::vesting_events(shares, start, &schedule)
                .context("Failed to build vesting timeline")?;
            print_json(&events)?;
        }
        Commands::Report {
            input,
            output,
            as_of,
            strict,
        } => {
            let json = read_input(input.as_deref())?;
            let records: Vec<GrantRecord> =
                serde_json::from_str(&json).context("Input must be a JSON array of grant rows")?;
            let now = resolve_as_of(as_of.as_deref())?;

            let report = vesting_engine::build_report(&records, now);
            if report.fallback_count > 0 {
                warn!(
                    fallback_count = report.fallback_count,
                    "rows used the default vesting schedule"
                );
            }

            let pretty = serde_json::to_string_pretty(&report)?;
            write_output(output.as_deref(), &pretty)?;

            if strict && report.has_errors() {
                anyhow::bail!(
                    "{} of {} rows failed validation",
                    report.error_count,
                    report.rows.len()
                );
            }
        }
    }

    Ok(())
}

/// Warnings by default, debug output for the engine with `--verbose`.
/// `RUST_LOG` takes precedence over both.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "vesting_engine=debug,vest=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// The reference date, falling back to today's local date.
fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(raw) => parse_date(raw).context("Invalid --as-of"),
        None => Ok(Local::now().date_naive()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    println!("{}", pretty);
    Ok(())
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
