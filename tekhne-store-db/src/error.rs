// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for store database operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store database operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open database with context
    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Database file not found
    #[error("Database not found at: {0}")]
    DatabaseNotFound(PathBuf),

    /// Schema version mismatch on a read-only open
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: i32, found: i32 },

    /// No active user matches the username/password-hash pair.
    ///
    /// Deliberately does not distinguish an unknown user from a wrong
    /// password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No step row exists for the given anchor id
    #[error("Report not found for step id {0}")]
    ReportNotFound(i64),

    /// A required input field is missing or empty
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness or foreign-key constraint rejected a write
    #[error("Integrity violation: {0}")]
    Integrity(String),
}
