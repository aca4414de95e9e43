// ABOUTME: Domain service layer combining repositories, goal arithmetic, and analytics
// ABOUTME: Produces the summary snapshots a presentation layer renders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services sit between the repositories and whatever front end drives the
//! engine (the CLI, an embedding app). They never render anything; they
//! return plain snapshot structs and emit analytics events.

/// Daily walking updates, goal changes, and weekly summaries
pub mod activity;

/// Heart-rate readings, daily summaries, and retention cleanup
pub mod heart_rate;

/// Step milestone detection
pub mod milestones;

pub use activity::{ActivityService, WalkingSummary, WalkingUpdate};
pub use heart_rate::{HeartRateService, HeartRateSummary};
pub use milestones::crossed_milestones;
