// ABOUTME: Configuration module grouping environment and database settings
// ABOUTME: All settings come from process environment with an optional .env file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Database URL and connection settings
pub mod database;
/// Environment-driven application configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{
    ActiveHours, AppConfig, Environment, LogLevel, ReminderConfig, SensorCapabilities,
    TrackingConfig,
};
