// ABOUTME: Structured error types for record store operations
// ABOUTME: Wraps sqlx failures with context and converts them into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Errors raised by the embedded record store
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not open or configure the connection pool
    #[error("Failed to connect to database: {context}")]
    ConnectionFailed {
        /// Description of the connection attempt
        context: String,
    },

    /// Schema creation or recreation failed
    #[error("Migration failed: {context}")]
    MigrationFailed {
        /// Migration step that failed
        context: String,
    },

    /// A query or statement failed to execute
    #[error("Query failed: {context}")]
    QueryError {
        /// Operation that failed
        context: String,
    },

    /// A transaction could not be started or committed
    #[error("Transaction failed: {context}")]
    TransactionFailed {
        /// Operation that failed
        context: String,
    },
}

impl DatabaseError {
    /// Wrap a sqlx error raised by the named query
    #[must_use]
    pub fn query(operation: &str, error: &sqlx::Error) -> Self {
        Self::QueryError {
            context: format!("{operation}: {error}"),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        Self::QueryError {
            context: error.to_string(),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(error).into()
    }
}
