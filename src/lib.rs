// ABOUTME: Main library entry point for the fittrack fitness tracking engine
// ABOUTME: Wires the record store, sensor ingestion, reminder loop, and domain services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # fittrack
//!
//! Headless fitness tracking: heart-rate and step/distance ingestion fed by
//! sensor callbacks, persistence in an embedded `SQLite` store, a background
//! reminder loop, and summary statistics for a presentation layer.
//!
//! ## Architecture
//!
//! - **Record store** (`database`): two tables plus a change feed
//! - **Aggregation** (`repositories`): catch-log-degrade access and watch streams
//! - **Sensor ingestion** (`tracking`): heart-rate monitor and walking tracker
//! - **Reminders** (`reminders`): periodic goal/inactivity notifications
//! - **Services** (`services`): summaries, milestones, and analytics events
//!
//! ## Example
//!
//! ```rust,no_run
//! use fittrack::database::Database;
//! use fittrack::repositories::{WalkingRepository, WalkingRepositoryImpl};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let database = Database::new("sqlite::memory:").await?;
//!     let walking = WalkingRepositoryImpl::new(database);
//!     walking.update_steps(4_200, 3_100.0, 42).await?;
//!     println!("progress: {:.1}%", walking.daily_goal_progress().await);
//!     Ok(())
//! }
//! ```

/// Fire-and-forget analytics events
pub mod analytics;

/// Environment-driven configuration
pub mod config;

/// `SQLite` record store and change notifications
pub mod database;

/// Component startup, health, and shutdown ordering
pub mod lifecycle;

/// Structured logging setup
pub mod logging;

/// Periodic activity reminders
pub mod reminders;

/// Catch-log-degrade repositories over the record store
pub mod repositories;

/// Presentation-facing summaries and goal tracking
pub mod services;

/// Sensor ingestion for heart rate, steps, and location
pub mod tracking;

/// Shared error types re-exported from `fittrack-core`
pub mod errors {
    pub use fittrack_core::errors::*;
}

/// Domain models re-exported from `fittrack-core`
pub mod models {
    pub use fittrack_core::models::*;
}

/// Constants re-exported from `fittrack-core`
pub mod constants {
    pub use fittrack_core::constants::*;
}

/// Time helpers re-exported from `fittrack-core`
pub mod time {
    pub use fittrack_core::time::*;
}
