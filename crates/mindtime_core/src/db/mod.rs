//! Local SQLite database holding the mindmap snapshot table.
//!
//! # Responsibility
//! - Open the database file (or an in-memory one for tests) and bring its
//!   schema up to date before any snapshot store touches it.
//! - Report bootstrap failures as [`DbError`] with a stable log code.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - `kv_store` exists on every connection handed out by this module.
//! - A database written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating the snapshot database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused the open, a pragma or a migration statement.
    Sqlite(rusqlite::Error),
    /// File carries a schema from a newer build.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
}

impl DbError {
    /// Stable log code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "snapshot database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "snapshot database schema {db_version} was written by a newer build (supported up to {latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
