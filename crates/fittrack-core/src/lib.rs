// ABOUTME: Core types and constants for the fittrack fitness tracking engine
// ABOUTME: Foundation crate with error handling, domain models, time windows, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Fittrack Core
//!
//! Foundation crate providing shared types and constants for the fittrack
//! engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **constants**: Validation ranges, tracking thresholds, and reminder timings
//! - **models**: `HeartRateSample` and `WalkingRecord` with their validation rules
//! - **time**: Millisecond timestamps, calendar-day bounds, and injectable clocks

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Persisted domain models (heart-rate samples, daily walking records)
pub mod models;

/// Timestamp helpers, time ranges, and clocks
pub mod time;
