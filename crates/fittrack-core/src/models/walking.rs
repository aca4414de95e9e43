// ABOUTME: Daily walking record model with goal progress and derived metrics
// ABOUTME: Maps the walking_records table; one record per local calendar day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::walking::{
    CALORIES_PER_STEP, DEFAULT_DAILY_GOAL, DEFAULT_STRIDE_LENGTH_METERS, MAX_DAILY_GOAL,
    MAX_DAILY_STEPS, MIN_DAILY_GOAL,
};
use serde::{Deserialize, Serialize};

/// Walking activity accumulated over one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-types", derive(sqlx::FromRow))]
pub struct WalkingRecord {
    /// Row id assigned by the store (0 before insertion)
    pub id: i64,
    /// Creation time of the record, epoch milliseconds
    pub date: i64,
    /// Steps taken today
    pub steps: i64,
    /// Distance walked in meters
    pub distance: f64,
    /// Daily step goal
    pub daily_goal: i64,
    /// Average speed in meters per second
    pub average_speed: f64,
    /// Estimated calories burned
    pub calories_burned: i64,
    /// Minutes with step activity
    pub active_minutes: i64,
}

impl WalkingRecord {
    /// Empty record for `date` with the default goal
    #[must_use]
    pub const fn new(date: i64) -> Self {
        Self {
            id: 0,
            date,
            steps: 0,
            distance: 0.0,
            daily_goal: DEFAULT_DAILY_GOAL,
            average_speed: 0.0,
            calories_burned: 0,
            active_minutes: 0,
        }
    }

    /// Same record with another goal
    #[must_use]
    pub const fn with_goal(mut self, daily_goal: i64) -> Self {
        self.daily_goal = daily_goal;
        self
    }

    /// Overwrite the activity fields and recompute the derived ones
    pub fn apply_activity(&mut self, steps: i64, distance: f64, active_minutes: i64) {
        self.steps = steps;
        self.distance = distance;
        self.active_minutes = active_minutes;
        self.calories_burned = calories_for_steps(steps);
        self.average_speed = average_speed(distance, active_minutes);
    }

    /// Progress towards the daily goal as a percentage (may exceed 100)
    #[must_use]
    pub fn goal_progress(&self) -> f64 {
        goal_progress(self.steps, self.daily_goal)
    }

    /// `steps ≥ daily_goal`
    #[must_use]
    pub const fn is_goal_achieved(&self) -> bool {
        self.steps >= self.daily_goal
    }

    /// Step count is plausible
    #[must_use]
    pub const fn is_valid_steps(&self) -> bool {
        is_valid_steps(self.steps)
    }

    /// Goal lies in the accepted range
    #[must_use]
    pub const fn is_valid_goal(&self) -> bool {
        is_valid_goal(self.daily_goal)
    }

    /// Steps still missing to reach the goal
    #[must_use]
    pub const fn remaining_steps(&self) -> i64 {
        let remaining = self.daily_goal - self.steps;
        if remaining > 0 {
            remaining
        } else {
            0
        }
    }
}

/// `(steps / goal) × 100`, or 0 for a non-positive goal
#[must_use]
pub fn goal_progress(steps: i64, daily_goal: i64) -> f64 {
    if daily_goal <= 0 {
        return 0.0;
    }
    steps as f64 / daily_goal as f64 * 100.0
}

/// `0 ≤ steps ≤ MAX_DAILY_STEPS`
#[must_use]
pub const fn is_valid_steps(steps: i64) -> bool {
    steps >= 0 && steps <= MAX_DAILY_STEPS
}

/// `MIN_DAILY_GOAL ≤ goal ≤ MAX_DAILY_GOAL`
#[must_use]
pub const fn is_valid_goal(goal: i64) -> bool {
    goal >= MIN_DAILY_GOAL && goal <= MAX_DAILY_GOAL
}

/// Calories estimate, truncated to whole calories
#[must_use]
pub fn calories_for_steps(steps: i64) -> i64 {
    (steps as f64 * CALORIES_PER_STEP) as i64
}

/// Meters per second over the active minutes, 0 when there were none
#[must_use]
pub fn average_speed(distance: f64, active_minutes: i64) -> f64 {
    if active_minutes <= 0 {
        return 0.0;
    }
    distance / (active_minutes as f64 * 60.0)
}

/// Distance estimate from steps when no location fixes are available
#[must_use]
pub fn estimated_distance(steps: i64) -> f64 {
    steps as f64 * DEFAULT_STRIDE_LENGTH_METERS
}
