// ABOUTME: fittrack CLI - query and update the record store, or run the tracking daemon
// ABOUTME: Daemon mode reads JSON-lines sensor events from stdin and runs the reminder loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Store a heart-rate reading and show the last 24 hours
//! fittrack heart-rate record 72 --accuracy 2
//! fittrack heart-rate summary
//!
//! # Update today's walking totals and change the goal
//! fittrack walking update --steps 6200 --distance 4300 --active-minutes 48
//! fittrack walking goal 12000
//!
//! # Weekly statistics as JSON
//! fittrack --json walking stats --window week
//!
//! # Feed sensor events to the daemon
//! cat sensor-events.jsonl | fittrack run
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fittrack::{
    analytics::{AnalyticsEvent, AnalyticsSink, TracingAnalytics},
    config::{AppConfig, DatabaseUrl, LogLevel},
    database::Database,
    logging::LoggingConfig,
    time::{Clock, SystemClock, Window},
};
use std::sync::Arc;
use tracing::info;

use commands::Context;

#[derive(Parser)]
#[command(
    name = "fittrack",
    about = "Headless fitness tracking engine",
    long_about = "Record and query heart-rate and walking data, or run the sensor ingestion daemon with activity reminders."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Heart-rate commands
    HeartRate {
        #[command(subcommand)]
        action: HeartRateCommand,
    },

    /// Walking commands
    Walking {
        #[command(subcommand)]
        action: WalkingCommand,
    },

    /// Run the tracking daemon on JSON-lines sensor events from stdin
    Run {
        /// Do not start the reminder loop
        #[arg(long)]
        no_reminders: bool,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum HeartRateCommand {
    /// Store a reading taken now
    Record {
        /// Beats per minute (40-220)
        bpm: i32,

        /// Sensor accuracy tier (0-3)
        #[arg(long, default_value = "3")]
        accuracy: i32,

        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },

    /// Show the latest reading
    Latest,

    /// Show count, average, max, and min over a window
    Stats {
        /// day, week, or month
        #[arg(long, default_value = "day", value_parser = parse_window)]
        window: Window,
    },

    /// Show the latest reading and the last 24 hours
    Summary,

    /// Delete readings older than the retention period
    Cleanup {
        /// Days to keep (defaults to the configured retention)
        #[arg(long)]
        keep_days: Option<u32>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum WalkingCommand {
    /// Show today's record
    Today,

    /// Write today's totals
    Update {
        /// Steps taken today
        #[arg(long)]
        steps: i64,

        /// Distance in meters (estimated from steps when omitted)
        #[arg(long)]
        distance: Option<f64>,

        /// Active minutes
        #[arg(long, default_value = "0")]
        active_minutes: i64,
    },

    /// Change the daily goal from today onward
    Goal {
        /// Steps per day (1000-100000)
        goal: i64,
    },

    /// Show totals and averages over a window
    Stats {
        /// day, week, or month
        #[arg(long, default_value = "week", value_parser = parse_window)]
        window: Window,
    },

    /// List daily records over a window
    History {
        /// day, week, or month
        #[arg(long, default_value = "week", value_parser = parse_window)]
        window: Window,

        /// Only days that reached their goal
        #[arg(long)]
        achieved: bool,
    },

    /// Show today's progress and the last 7 days
    Summary,
}

fn parse_window(value: &str) -> std::result::Result<Window, String> {
    Window::parse(value).ok_or_else(|| format!("unknown window '{value}', use day, week, or month"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    logging.init()?;

    let mut config = AppConfig::load()?;
    if let Some(url) = cli.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    info!("{}", config.summary());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let database =
        Database::with_clock(&config.database.url.to_connection_string(), Arc::clone(&clock))
            .await?;

    let analytics: Arc<dyn AnalyticsSink> = Arc::new(TracingAnalytics);
    analytics.log_event(&AnalyticsEvent::feature_used("app_launch"));

    let ctx = Context {
        database,
        config,
        analytics,
        clock,
        json: cli.json,
    };

    // The daemon migrates through its component manager
    if !matches!(cli.command, Command::Run { .. }) {
        ctx.database.migrate().await?;
    }

    match cli.command {
        Command::HeartRate { action } => match action {
            HeartRateCommand::Record {
                bpm,
                accuracy,
                note,
            } => commands::heart_rate::record(&ctx, bpm, accuracy, note).await?,
            HeartRateCommand::Latest => commands::heart_rate::latest(&ctx).await?,
            HeartRateCommand::Stats { window } => commands::heart_rate::stats(&ctx, window).await?,
            HeartRateCommand::Summary => commands::heart_rate::summary(&ctx).await?,
            HeartRateCommand::Cleanup { keep_days } => {
                commands::heart_rate::cleanup(&ctx, keep_days).await?;
            }
        },
        Command::Walking { action } => match action {
            WalkingCommand::Today => commands::walking::today(&ctx).await?,
            WalkingCommand::Update {
                steps,
                distance,
                active_minutes,
            } => commands::walking::update(&ctx, steps, distance, active_minutes).await?,
            WalkingCommand::Goal { goal } => commands::walking::goal(&ctx, goal).await?,
            WalkingCommand::Stats { window } => commands::walking::stats(&ctx, window).await?,
            WalkingCommand::History { window, achieved } => {
                commands::walking::history(&ctx, window, achieved).await?;
            }
            WalkingCommand::Summary => commands::walking::summary(&ctx).await?,
        },
        Command::Run { no_reminders } => commands::run::run(&ctx, no_reminders).await?,
    }

    Ok(())
}
