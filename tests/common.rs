// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory stores on a manual clock, and tracker builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `fittrack`
//!
//! Every store runs on `sqlite::memory:` and a [`ManualClock`] frozen at local
//! noon, so day-boundary behaviour is deterministic.

use anyhow::Result;
use fittrack::{
    analytics::MemoryAnalytics,
    database::Database,
    repositories::{HeartRateRepositoryImpl, WalkingRepositoryImpl},
    time::{at_local_hour, ManualClock},
    tracking::{
        HeartRateMonitor, HeartRateMonitorConfig, WalkingTracker, WalkingTrackerConfig,
    },
};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Fixed reference day for tests (mid June 2025)
const REFERENCE_MS: i64 = 1_750_000_000_000;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Local noon on the reference day
pub fn noon() -> i64 {
    at_local_hour(REFERENCE_MS, 12)
}

/// In-memory store with the clock that drives it
pub struct TestStore {
    pub database: Database,
    pub clock: ManualClock,
    pub analytics: Arc<MemoryAnalytics>,
}

impl TestStore {
    pub fn heart_rate_repository(&self) -> Arc<HeartRateRepositoryImpl> {
        Arc::new(HeartRateRepositoryImpl::new(self.database.clone()))
    }

    pub fn walking_repository(&self) -> Arc<WalkingRepositoryImpl> {
        Arc::new(WalkingRepositoryImpl::new(self.database.clone()))
    }

    pub fn heart_rate_monitor(&self, config: HeartRateMonitorConfig) -> HeartRateMonitor {
        HeartRateMonitor::new(
            self.heart_rate_repository(),
            self.analytics.clone(),
            Arc::new(self.clock.clone()),
            config,
        )
    }

    pub fn walking_tracker(&self, config: WalkingTrackerConfig) -> WalkingTracker {
        WalkingTracker::new(
            self.walking_repository(),
            self.analytics.clone(),
            Arc::new(self.clock.clone()),
            config,
        )
    }
}

/// Standard test store at local noon on the reference day
pub async fn create_test_store() -> Result<TestStore> {
    create_test_store_at(noon()).await
}

/// Test store whose clock starts at `now_ms`
pub async fn create_test_store_at(now_ms: i64) -> Result<TestStore> {
    init_test_logging();
    let clock = ManualClock::new(now_ms);
    let database = Database::with_clock("sqlite::memory:", Arc::new(clock.clone())).await?;
    Ok(TestStore {
        database,
        clock,
        analytics: Arc::new(MemoryAnalytics::new()),
    })
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_for<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
