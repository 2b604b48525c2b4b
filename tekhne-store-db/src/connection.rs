// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database connection management.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::{DROP_SQL, SCHEMA_SQL, SCHEMA_VERSION, SEED_SQL};

/// Database open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only access
    ReadOnly,
    /// Read-write access to an existing database
    ReadWrite,
    /// Create new database if it doesn't exist
    Create,
}

/// SQLite database connection for maintenance procedure records.
pub struct ReportDb {
    pub(crate) conn: Connection,
}

impl ReportDb {
    /// Open or create a database at the given path.
    ///
    /// Foreign-key enforcement is enabled on every open. Writable opens
    /// bring the schema up to [`SCHEMA_VERSION`], taking the destructive
    /// rebuild path on any mismatch; a read-only open with a mismatched
    /// version fails instead, since it cannot rebuild.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let flags = match mode {
            OpenMode::ReadOnly => {
                if !path.exists() {
                    return Err(Error::DatabaseNotFound(path.to_owned()));
                }
                OpenFlags::SQLITE_OPEN_READ_ONLY
            }
            OpenMode::ReadWrite => {
                if !path.exists() {
                    return Err(Error::DatabaseNotFound(path.to_owned()));
                }
                OpenFlags::SQLITE_OPEN_READ_WRITE
            }
            OpenMode::Create => OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(|e| Error::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        })?;
        let db = Self { conn };

        match mode {
            OpenMode::ReadOnly => {
                db.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                db.check_version()?;
            }
            OpenMode::ReadWrite | OpenMode::Create => {
                db.configure_pragmas()?;
                db.ensure_schema()?;
            }
        }

        debug!("Opened database at {} ({:?})", path.display(), mode);
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    ///
    /// The database is initialized with the full schema and seed rows.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.configure_pragmas()?;
        db.ensure_schema()?;
        debug!("Created in-memory database");
        Ok(db)
    }

    /// Configure SQLite pragmas for writable connections.
    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;
        Ok(())
    }

    fn schema_version(&self) -> Result<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn check_version(&self) -> Result<()> {
        let found = self.schema_version()?;
        if found != SCHEMA_VERSION {
            return Err(Error::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        Ok(())
    }

    /// Bring the database to the current schema version.
    ///
    /// A fresh database gets the schema and seed rows. Any other version is
    /// handled destructively: all four tables are dropped (children first),
    /// recreated and re-seeded. No data survives a version bump.
    fn ensure_schema(&self) -> Result<()> {
        let found = self.schema_version()?;
        if found == SCHEMA_VERSION && self.has_schema()? {
            return Ok(());
        }

        if found != 0 || self.has_schema()? {
            warn!(
                "Rebuilding database: schema version {found} != {SCHEMA_VERSION}, existing rows are discarded"
            );
            self.conn.execute_batch(DROP_SQL)?;
        }

        self.conn.execute_batch(SCHEMA_SQL)?;
        self.conn.execute_batch(SEED_SQL)?;
        self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        debug!("Created database schema (version {SCHEMA_VERSION})");
        Ok(())
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable raw connection (for transactions).
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Check if the database has the expected schema tables.
    pub fn has_schema(&self) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='steps'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
