// ABOUTME: SQLite record store for heart-rate samples and daily walking records
// ABOUTME: Owns the connection pool, versioned schema creation, and the table change feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Record Store
//!
//! Two independent tables, `heart_rate_records` and `walking_records`, in an
//! embedded `SQLite` database. The schema version lives in
//! `PRAGMA user_version`; when it differs from [`SCHEMA_VERSION`] every table
//! is dropped and recreated, and a default walking record is seeded.
//!
//! Every successful write publishes a [`TableChange`] on a broadcast channel so
//! watchers can re-run their queries.

mod heart_rate;
mod walking;

pub use heart_rate::HeartRateStats;
pub use walking::WalkingStats;

use crate::config::DatabaseUrl;
use crate::errors::{AppResult, DatabaseError};
use crate::models::WalkingRecord;
use crate::time::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Current schema version stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Buffered change notifications per subscriber before it starts lagging
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Tables in the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// `heart_rate_records`
    HeartRate,
    /// `walking_records`
    Walking,
}

impl Table {
    /// SQL table name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate_records",
            Self::Walking => "walking_records",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of write that touched a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Rows were inserted
    Insert,
    /// Rows were updated
    Update,
    /// Rows were deleted
    Delete,
}

/// Notification published after every successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    /// Table that changed
    pub table: Table,
    /// What happened
    pub kind: ChangeKind,
}

/// Database manager for the fitness record tables
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    changes: broadcast::Sender<TableChange>,
    clock: Arc<dyn Clock>,
}

impl Database {
    /// Open (creating if needed) the store at `database_url` and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        Self::with_clock(database_url, Arc::new(SystemClock)).await
    }

    /// Like [`Database::new`] with an explicit clock for "today" and seeding
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or migration fails
    pub async fn with_clock(database_url: &str, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let url = DatabaseUrl::parse_url(database_url)?;
        let pool = Self::connect(&url).await?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let db = Self {
            pool,
            changes,
            clock,
        };

        db.migrate().await?;
        info!(database = %url, "Record store ready");

        Ok(db)
    }

    async fn connect(url: &DatabaseUrl) -> AppResult<Pool<Sqlite>> {
        let connection_failed = |e: sqlx::Error| DatabaseError::ConnectionFailed {
            context: format!("{url}: {e}"),
        };

        match url {
            // Every pooled connection to :memory: would get its own database, so
            // keep exactly one connection alive for the lifetime of the pool
            DatabaseUrl::Memory => {
                let options =
                    SqliteConnectOptions::from_str("sqlite::memory:").map_err(connection_failed)?;
                Ok(SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .map_err(connection_failed)?)
            }
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                // Ensure SQLite creates the database file if it doesn't exist
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                Ok(SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(connection_failed)?)
            }
        }
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Clock used for "today" lookups and seeding
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Current time according to the store's clock
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Subscribe to table change notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }

    fn notify(&self, table: Table, kind: ChangeKind) {
        // No receivers is the common case outside of watch streams
        if self.changes.send(TableChange { table, kind }).is_err() {
            debug!(table = %table, ?kind, "Change published with no subscribers");
        }
    }

    /// Bring the schema to [`SCHEMA_VERSION`], recreating tables on mismatch
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        let version = self.schema_version().await?;

        if version != SCHEMA_VERSION {
            if version != 0 {
                warn!(
                    from = version,
                    to = SCHEMA_VERSION,
                    "Schema version changed, dropping and recreating all tables"
                );
                self.drop_tables().await?;
            }
            self.create_tables().await?;
            sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationFailed {
                    context: format!("set schema version: {e}"),
                })?;
            self.seed_default_walking_record().await?;
        } else {
            self.create_tables().await?;
        }

        Ok(())
    }

    /// Schema version recorded in the database file
    ///
    /// # Errors
    ///
    /// Returns an error if the pragma cannot be read
    pub async fn schema_version(&self) -> AppResult<i64> {
        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                context: format!("read schema version: {e}"),
            })?;
        Ok(version)
    }

    async fn create_tables(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS heart_rate_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                heart_rate INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                note TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_heart_rate_records_timestamp ON heart_rate_records(timestamp)",
            r"
            CREATE TABLE IF NOT EXISTS walking_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date INTEGER NOT NULL,
                steps INTEGER NOT NULL DEFAULT 0,
                distance REAL NOT NULL DEFAULT 0.0,
                daily_goal INTEGER NOT NULL DEFAULT 10000,
                average_speed REAL NOT NULL DEFAULT 0.0,
                calories_burned INTEGER NOT NULL DEFAULT 0,
                active_minutes INTEGER NOT NULL DEFAULT 0
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_walking_records_date ON walking_records(date)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationFailed {
                    context: format!("create tables: {e}"),
                })?;
        }

        Ok(())
    }

    async fn drop_tables(&self) -> AppResult<()> {
        for table in [Table::HeartRate, Table::Walking] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.name()))
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationFailed {
                    context: format!("drop {table}: {e}"),
                })?;
        }
        Ok(())
    }

    async fn seed_default_walking_record(&self) -> AppResult<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM walking_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("count walking records", &e))?;
        if existing > 0 {
            return Ok(());
        }

        let seeded = self
            .insert_walking_record(&WalkingRecord::new(self.now_millis()))
            .await?;
        debug!(id = seeded.id, "Seeded default walking record");
        Ok(())
    }
}
