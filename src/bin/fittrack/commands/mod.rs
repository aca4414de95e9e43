// ABOUTME: Command modules for the fittrack CLI and the context they share
// ABOUTME: The context wires the record store, repositories, services, and analytics sink
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod heart_rate;
pub mod run;
pub mod walking;

use fittrack::{
    analytics::AnalyticsSink,
    config::AppConfig,
    database::Database,
    errors::AppResult,
    repositories::{
        HeartRateRepository, HeartRateRepositoryImpl, WalkingRepository, WalkingRepositoryImpl,
    },
    services::{ActivityService, HeartRateService},
    time::Clock,
};
use serde::Serialize;
use std::sync::Arc;

/// Everything a command needs
pub struct Context {
    pub database: Database,
    pub config: AppConfig,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub clock: Arc<dyn Clock>,
    pub json: bool,
}

impl Context {
    pub fn heart_rate_repository(&self) -> Arc<dyn HeartRateRepository> {
        Arc::new(HeartRateRepositoryImpl::new(self.database.clone()))
    }

    pub fn walking_repository(&self) -> Arc<dyn WalkingRepository> {
        Arc::new(WalkingRepositoryImpl::new(self.database.clone()))
    }

    pub fn heart_rate_service(&self) -> HeartRateService {
        HeartRateService::new(
            self.heart_rate_repository(),
            Arc::clone(&self.analytics),
            Arc::clone(&self.clock),
            self.config.tracking.heart_rate_retention,
        )
    }

    pub fn activity_service(&self) -> ActivityService {
        ActivityService::new(
            self.walking_repository(),
            Arc::clone(&self.analytics),
            Arc::clone(&self.clock),
        )
    }

    /// Print `value` as pretty JSON when `--json` was given; false otherwise
    pub fn emit_json<T: Serialize>(&self, value: &T) -> AppResult<bool> {
        if !self.json {
            return Ok(false);
        }
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(true)
    }
}
