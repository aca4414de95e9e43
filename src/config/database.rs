// ABOUTME: Database configuration types for SQLite file and in-memory stores
// ABOUTME: Parses FITTRACK_DATABASE_URL into a type-safe DatabaseUrl
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// Environment variable holding the database URL
pub const DATABASE_URL_ENV: &str = "FITTRACK_DATABASE_URL";

/// Default on-disk location of the record store
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/fittrack.db";

/// Type-safe database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the URL names an unsupported backend or is empty
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::config_invalid(
                DATABASE_URL_ENV,
                s,
                "database URL must not be empty",
            ));
        }

        if let Some(path_str) = trimmed.strip_prefix("sqlite:") {
            let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
            if path_str == ":memory:" || path_str.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path_str),
                })
            }
        } else if trimmed.contains("://") {
            Err(AppError::config_invalid(
                DATABASE_URL_ENV,
                s,
                "only sqlite: URLs are supported",
            ))
        } else {
            // Fallback: treat as SQLite file path
            Ok(Self::SQLite {
                path: PathBuf::from(trimmed),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// File backing the store, if any
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::SQLite { path } => Some(path.as_path()),
            Self::Memory => None,
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/fittrack.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (`SQLite` path or in-memory)
    pub url: DatabaseUrl,
}

impl DatabaseConfig {
    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if `FITTRACK_DATABASE_URL` is invalid
    pub fn from_env() -> AppResult<Self> {
        let raw = env::var(DATABASE_URL_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        Ok(Self {
            url: DatabaseUrl::parse_url(&raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_parse_sqlite_urls() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite::memory:").ok(),
            Some(DatabaseUrl::Memory)
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/x.db").ok(),
            Some(DatabaseUrl::SQLite {
                path: PathBuf::from("./data/x.db")
            })
        );
        assert_eq!(
            DatabaseUrl::parse_url("fitness.db").ok(),
            Some(DatabaseUrl::SQLite {
                path: PathBuf::from("fitness.db")
            })
        );
    }

    #[test]
    fn test_rejects_other_backends() {
        let err = DatabaseUrl::parse_url("postgres://localhost/db").err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ConfigInvalid));
        assert!(DatabaseUrl::parse_url("   ").is_err());
    }

    #[test]
    fn test_connection_string_round_trip() {
        let url = DatabaseUrl::SQLite {
            path: PathBuf::from("/tmp/fit.db"),
        };
        assert_eq!(url.to_connection_string(), "sqlite:/tmp/fit.db");
        assert_eq!(DatabaseUrl::Memory.to_string(), "sqlite::memory:");
        assert!(DatabaseUrl::Memory.file_path().is_none());
    }
}
