//! Document snapshot persistence over a local key-value table.
//!
//! # Responsibility
//! - Keep exactly one "current" document snapshot per store key.
//! - Shield callers from storage failures: writes never surface errors and
//!   unreadable data is reported as absence.
//!
//! # Invariants
//! - A failed save leaves the previously stored value untouched.
//! - `load()` never returns structurally malformed data.
//! - Stored payload shape is `{ nodes, edges, lastUpdated }`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::document::Document;
use crate::model::edge::Edge;
use crate::model::node::Node;
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Key used by application sessions unless configured otherwise.
pub const DEFAULT_SNAPSHOT_KEY: &str = "mindtime-mindmap-data";

/// Result type used by fallible snapshot repository internals.
pub type SnapshotRepoResult<T> = Result<T, SnapshotRepoError>;

/// Errors from snapshot repository setup and raw storage access.
#[derive(Debug)]
pub enum SnapshotRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Store key is blank after trim.
    InvalidKey,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Document could not be encoded as JSON.
    Serialize(serde_json::Error),
}

impl Display for SnapshotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey => write!(f, "snapshot key must not be blank"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot repository requires table `{table}`")
            }
            Self::Serialize(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for SnapshotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::InvalidKey => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for SnapshotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SnapshotRepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Persisted snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// RFC 3339 UTC timestamp of the save. Empty when an older payload
    /// omitted it.
    #[serde(default)]
    pub last_updated: String,
}

impl PersistedSnapshot {
    /// Wraps `document` with the current UTC time.
    pub fn capture(document: &Document) -> Self {
        Self {
            nodes: document.nodes.clone(),
            edges: document.edges.clone(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn into_document(self) -> Document {
        Document::new(self.nodes, self.edges)
    }
}

/// Durable single-snapshot store.
///
/// Implementations swallow failures: callers keep working in memory when
/// storage is unavailable.
pub trait SnapshotStore {
    /// Key this store reads and writes.
    fn key(&self) -> &str;
    /// Replaces the stored snapshot. Returns whether the write happened.
    fn save(&self, document: &Document) -> bool;
    /// Reads the stored snapshot, `None` when absent or malformed.
    fn load(&self) -> Option<PersistedSnapshot>;
    /// Removes the stored snapshot. Returns whether the delete ran.
    fn clear(&self) -> bool;
    /// Returns whether a snapshot is stored. `false` on read failure.
    fn exists(&self) -> bool;
}

/// SQLite-backed snapshot store bound to one key.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    /// Creates a store on a migrated connection.
    ///
    /// # Errors
    /// - `InvalidKey` when `key` is blank.
    /// - Schema errors when the connection was not opened through
    ///   [`crate::db::open_db`] or [`crate::db::open_db_in_memory`].
    pub fn try_new(conn: &'conn Connection, key: impl Into<String>) -> SnapshotRepoResult<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(SnapshotRepoError::InvalidKey);
        }
        ensure_snapshot_connection_ready(conn)?;
        Ok(Self { conn, key })
    }

    /// Creates a store using [`DEFAULT_SNAPSHOT_KEY`].
    pub fn with_default_key(conn: &'conn Connection) -> SnapshotRepoResult<Self> {
        Self::try_new(conn, DEFAULT_SNAPSHOT_KEY)
    }

    fn try_save(&self, document: &Document) -> SnapshotRepoResult<()> {
        let payload = serde_json::to_string(&PersistedSnapshot::capture(document))?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), payload],
        )?;
        Ok(())
    }

    fn read_raw(&self) -> SnapshotRepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn try_clear(&self) -> SnapshotRepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [self.key.as_str()])?;
        Ok(())
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn key(&self) -> &str {
        &self.key
    }

    fn save(&self, document: &Document) -> bool {
        let started_at = Instant::now();
        match self.try_save(document) {
            Ok(()) => {
                info!(
                    "event=snapshot_save module=repo status=ok nodes={} edges={} duration_ms={}",
                    document.nodes.len(),
                    document.edges.len(),
                    started_at.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=repo status=error error_code=snapshot_save_failed error={}",
                    err
                );
                false
            }
        }
    }

    fn load(&self) -> Option<PersistedSnapshot> {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!(
                    "event=snapshot_load module=repo status=error error_code=snapshot_read_failed error={}",
                    err
                );
                return None;
            }
        };

        let snapshot = decode_snapshot(&raw);
        if let Some(snapshot) = &snapshot {
            info!(
                "event=snapshot_load module=repo status=ok nodes={} edges={}",
                snapshot.nodes.len(),
                snapshot.edges.len()
            );
        }
        snapshot
    }

    fn clear(&self) -> bool {
        match self.try_clear() {
            Ok(()) => {
                info!("event=snapshot_clear module=repo status=ok");
                true
            }
            Err(err) => {
                error!(
                    "event=snapshot_clear module=repo status=error error_code=snapshot_clear_failed error={}",
                    err
                );
                false
            }
        }
    }

    fn exists(&self) -> bool {
        matches!(self.read_raw(), Ok(Some(_)))
    }
}

/// Decodes a stored payload, treating every malformed shape as absence.
fn decode_snapshot(raw: &str) -> Option<PersistedSnapshot> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=snapshot_load module=repo status=ignored reason=invalid_json error={}",
                err
            );
            return None;
        }
    };

    let has_arrays = value.get("nodes").is_some_and(Value::is_array)
        && value.get("edges").is_some_and(Value::is_array);
    if !has_arrays {
        warn!("event=snapshot_load module=repo status=ignored reason=invalid_shape");
        return None;
    }

    match serde_json::from_value::<PersistedSnapshot>(value) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(
                "event=snapshot_load module=repo status=ignored reason=invalid_records error={}",
                err
            );
            None
        }
    }
}

fn ensure_snapshot_connection_ready(conn: &Connection) -> SnapshotRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(SnapshotRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'kv_store'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(SnapshotRepoError::MissingRequiredTable("kv_store"));
    }
    Ok(())
}
