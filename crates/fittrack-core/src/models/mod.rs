// ABOUTME: Persisted domain models for the fittrack record store
// ABOUTME: Heart-rate samples and daily walking records with validation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Heart-rate sample model
pub mod heart_rate;
/// Daily walking record model
pub mod walking;

pub use heart_rate::{is_valid_accuracy, is_valid_heart_rate, HeartRateSample, SensorAccuracy};
pub use walking::{
    average_speed, calories_for_steps, estimated_distance, goal_progress, is_valid_goal,
    is_valid_steps, WalkingRecord,
};
