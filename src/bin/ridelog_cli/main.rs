// ABOUTME: Ridelog CLI - command-line front end for snapshots, history, and activity import
// ABOUTME: Loads engine configuration, opens the configured store, and prints JSON results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors
//!
//! Usage:
//! ```bash
//! # Import provider reports (JSON array) for an athlete
//! ridelog-cli activity import --athlete <uuid> --file rides.json
//!
//! # Recompute one week
//! ridelog-cli snapshot compute --athlete <uuid> --week 2025-03-10
//!
//! # Backfill the last 20 weeks
//! ridelog-cli snapshot backfill --athlete <uuid> --weeks 20
//!
//! # Refresh the week containing an activity
//! ridelog-cli snapshot update --athlete <uuid> --activity-date 2025-03-12T07:30:00Z
//!
//! # Show the last 12 weekly snapshots
//! ridelog-cli history --athlete <uuid> --weeks 12
//!
//! # Power-curve progression over 90-day windows
//! ridelog-cli progression --athlete <uuid> --window-days 90
//! ```

mod commands;
mod helpers;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use ridelog::config::{DatabaseUrl, EngineConfig};
use ridelog::database::Stores;
use ridelog::logging::LoggingConfig;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use commands::Engine;

#[derive(Parser)]
#[command(
    name = "ridelog-cli",
    about = "Ridelog training-load engine CLI",
    long_about = "Import activities, compute weekly snapshots, and inspect training history."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (`sqlite::memory:` or a file path)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Weekly snapshot commands
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommand,
    },

    /// Show stored weekly snapshots, backfilling when none exist
    History {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Number of weeks to show
        #[arg(long, default_value = "12")]
        weeks: u32,
    },

    /// Show how best power per duration moved across the history
    Progression {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Trailing window length in days (1 to 3650, default 90)
        #[arg(long)]
        window_days: Option<i64>,
    },

    /// Activity commands
    Activity {
        #[command(subcommand)]
        action: ActivityCommand,
    },

    /// Athlete preference commands
    Preferences {
        #[command(subcommand)]
        action: PreferencesCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum SnapshotCommand {
    /// Compute the snapshot for the week containing a date
    Compute {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Any date in the week (normalized to Monday)
        #[arg(long)]
        week: NaiveDate,
    },

    /// Backfill snapshots ending with the current week
    Backfill {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Weeks to backfill (defaults to RIDELOG_BACKFILL_WEEKS)
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// Recompute the week containing an activity
    Update {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Activity start time (RFC 3339)
        #[arg(long)]
        activity_date: DateTime<Utc>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ActivityCommand {
    /// Import a JSON array of provider reports
    Import {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Path to the JSON file
        #[arg(long)]
        file: PathBuf,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum PreferencesCommand {
    /// Store FTP and heart-rate preferences
    Set {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Functional threshold power in watts
        #[arg(long)]
        ftp: Option<f64>,

        /// Resting heart rate in bpm
        #[arg(long)]
        resting_hr: Option<f64>,

        /// Maximum heart rate in bpm
        #[arg(long)]
        max_hr: Option<f64>,
    },

    /// Show stored preferences
    Show {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env().with_verbosity(cli.verbose).init()?;

    let mut config = EngineConfig::from_env()?;
    if let Some(url) = cli.database_url.as_deref() {
        config.database_url = DatabaseUrl::parse_url(url)?;
    }

    info!(database = %config.database_url, "Opening store");
    let stores = Stores::connect(&config.database_url).await?;
    let engine = Engine::new(stores, &config);

    match cli.command {
        Command::Snapshot { action } => match action {
            SnapshotCommand::Compute { athlete, week } => {
                commands::snapshot::compute(&engine, athlete, week).await?;
            }
            SnapshotCommand::Backfill { athlete, weeks } => {
                commands::snapshot::backfill(&engine, athlete, weeks).await?;
            }
            SnapshotCommand::Update {
                athlete,
                activity_date,
            } => {
                commands::snapshot::update(&engine, athlete, activity_date).await?;
            }
        },
        Command::History { athlete, weeks } => {
            commands::snapshot::history(&engine, athlete, weeks).await?;
        }
        Command::Progression {
            athlete,
            window_days,
        } => {
            commands::snapshot::progression(&engine, athlete, window_days).await?;
        }
        Command::Activity { action } => match action {
            ActivityCommand::Import { athlete, file } => {
                commands::activity::import(&engine, athlete, &file).await?;
            }
        },
        Command::Preferences { action } => match action {
            PreferencesCommand::Set {
                athlete,
                ftp,
                resting_hr,
                max_hr,
            } => {
                commands::preferences::set(&engine, athlete, ftp, resting_hr, max_hr).await?;
            }
            PreferencesCommand::Show { athlete } => {
                commands::preferences::show(&engine, athlete).await?;
            }
        },
    }

    Ok(())
}
