//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose mindmap editing intents to Dart via FRB.
//! - Keep one in-memory session document per process and write every change
//!   through to the persisted snapshot.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls are serialized; each call sees the document the previous call left,
//!   whether or not its save succeeded.
//! - The first call restores the stored snapshot (or the seed).
//! - Rejected imports leave the session document untouched.

use chrono::Local;
use log::warn;
use mindtime_core::db::open_db;
use mindtime_core::{
    core_version as core_version_inner, deserialize, init_logging as init_logging_inner,
    ping as ping_inner, suggested_file_name, Document, DocumentService, NodeFieldUpdate,
    Position, SqliteSnapshotStore,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const DOCUMENT_DB_FILE_NAME: &str = "mindtime_document.sqlite3";
static DOCUMENT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<SessionState>> = Mutex::new(None);

type SessionService<'conn> = DocumentService<SqliteSnapshotStore<'conn>>;

/// Session document kept between calls.
struct SessionState {
    document: Document,
    persisted: bool,
}

/// Result of one session call plus the persistence state it left behind.
struct SessionOutcome<T> {
    value: T,
    persisted: bool,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Action response envelope for document mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentActionResponse {
    /// Whether the call completed without error.
    pub ok: bool,
    /// Whether the document changed.
    pub changed: bool,
    /// Whether the stored snapshot matches the session document. `false`
    /// means the change lives in memory only because saving failed.
    pub persisted: bool,
    /// Node created by the call, if any.
    pub node_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

const UNSAVED_SUFFIX: &str = " Saving failed; changes are kept in memory.";

impl DocumentActionResponse {
    fn applied(changed: bool, persisted: bool, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if changed && !persisted {
            message.push_str(UNSAVED_SUFFIX);
        }
        Self {
            ok: true,
            changed,
            persisted,
            node_id: None,
            message,
        }
    }

    fn created(node_id: String, persisted: bool) -> Self {
        Self {
            node_id: Some(node_id),
            ..Self::applied(true, persisted, "Node created.")
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            persisted: false,
            node_id: None,
            message: message.into(),
        }
    }
}

/// JSON text response for snapshot and export calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentJsonResponse {
    pub ok: bool,
    /// JSON payload; empty on failure.
    pub json: String,
    pub message: String,
}

/// Returns the current document as `{ nodes, edges }` JSON.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Starts from the seed document when nothing is stored yet.
#[flutter_rust_bridge::frb(sync)]
pub fn document_snapshot_json() -> DocumentJsonResponse {
    let encoded = with_document_service(|service| {
        serde_json::to_string(service.document()).map_err(|err| err.to_string())
    })
    .and_then(|outcome| outcome.value);
    json_response(encoded, "document_snapshot_json")
}

/// Replaces one payload field of a node.
///
/// `field` uses the wire names (`label`, `backgroundColor`, `completed`, ...).
/// Unknown node ids are a no-op (`ok=true`, `changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn node_update_field(node_id: String, field: String, value: String) -> DocumentActionResponse {
    let update = match NodeFieldUpdate::parse(field.trim(), &value) {
        Ok(update) => update,
        Err(err) => {
            return DocumentActionResponse::failure(format!("node_update_field failed: {err}"))
        }
    };
    mutation_response(
        with_document_service(|service| service.update_node_field(node_id.trim(), update)),
        "node_update_field",
    )
}

/// Creates a default node connected from `source_id` at `(x, y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn node_create_connected(source_id: String, x: f64, y: f64) -> DocumentActionResponse {
    match with_document_service(|service| {
        service.create_connected_node(source_id.trim(), Position::new(x, y))
    }) {
        Ok(SessionOutcome {
            value: Some(node_id),
            persisted,
        }) => DocumentActionResponse::created(node_id, persisted),
        Ok(SessionOutcome {
            value: None,
            persisted,
        }) => DocumentActionResponse::applied(false, persisted, "Source node not found."),
        Err(err) => DocumentActionResponse::failure(format!("node_create_connected failed: {err}")),
    }
}

/// Adds an edge between two existing nodes.
#[flutter_rust_bridge::frb(sync)]
pub fn edge_connect(source_id: String, target_id: String) -> DocumentActionResponse {
    mutation_response(
        with_document_service(|service| {
            service.connect_existing(source_id.trim(), target_id.trim())
        }),
        "edge_connect",
    )
}

/// Deletes a node and every edge touching it.
#[flutter_rust_bridge::frb(sync)]
pub fn node_delete(node_id: String) -> DocumentActionResponse {
    mutation_response(
        with_document_service(|service| service.delete_node(node_id.trim())),
        "node_delete",
    )
}

/// Sets `color` on a node and every descendant reachable from it.
#[flutter_rust_bridge::frb(sync)]
pub fn node_propagate_color(node_id: String, color: String) -> DocumentActionResponse {
    mutation_response(
        with_document_service(|service| service.propagate_color(node_id.trim(), &color)),
        "node_propagate_color",
    )
}

/// Moves a node to `(x, y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn node_move(node_id: String, x: f64, y: f64) -> DocumentActionResponse {
    mutation_response(
        with_document_service(|service| service.move_node(node_id.trim(), Position::new(x, y))),
        "node_move",
    )
}

/// Replaces the document with the sample mindmap.
#[flutter_rust_bridge::frb(sync)]
pub fn document_load_sample() -> DocumentActionResponse {
    match with_document_service(|service| service.load_sample()) {
        Ok(outcome) => DocumentActionResponse::applied(true, outcome.persisted, "Sample loaded."),
        Err(err) => DocumentActionResponse::failure(format!("document_load_sample failed: {err}")),
    }
}

/// Clears the stored document and restarts from the seed.
#[flutter_rust_bridge::frb(sync)]
pub fn document_reset() -> DocumentActionResponse {
    match with_document_service(|service| service.reset_to_seed()) {
        Ok(outcome) => DocumentActionResponse::applied(true, outcome.persisted, "Document reset."),
        Err(err) => DocumentActionResponse::failure(format!("document_reset failed: {err}")),
    }
}

/// Encodes the current document as pretty exchange JSON.
///
/// Blank or absent `title` falls back to the default export title.
#[flutter_rust_bridge::frb(sync)]
pub fn document_export_json(
    title: Option<String>,
    description: Option<String>,
) -> DocumentJsonResponse {
    let encoded = with_document_service(|service| {
        service
            .export(title.as_deref(), description.as_deref())
            .to_json_pretty()
            .map_err(|err| err.to_string())
    })
    .and_then(|outcome| outcome.value);
    json_response(encoded, "document_export_json")
}

/// Validates exchange `text` and replaces the document with it.
///
/// On validation failure `message` carries the exact validation message and
/// the stored document is not touched.
#[flutter_rust_bridge::frb(sync)]
pub fn document_import_json(text: String) -> DocumentActionResponse {
    let imported = match deserialize(&text) {
        Ok(imported) => imported,
        Err(err) => return DocumentActionResponse::failure(err.to_string()),
    };
    match with_document_service(|service| service.apply_import(imported)) {
        Ok(SessionOutcome {
            value: metadata,
            persisted,
        }) => {
            let message = if metadata.title.is_empty() {
                "Mindmap imported.".to_string()
            } else {
                format!("Imported \"{}\".", metadata.title)
            };
            DocumentActionResponse::applied(true, persisted, message)
        }
        Err(err) => DocumentActionResponse::failure(format!("document_import_json failed: {err}")),
    }
}

/// Suggested export file name for today's local date.
#[flutter_rust_bridge::frb(sync)]
pub fn document_suggested_file_name(title: Option<String>) -> String {
    suggested_file_name(title.as_deref(), Local::now().date_naive())
}

fn resolve_document_db_path() -> PathBuf {
    DOCUMENT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MINDTIME_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DOCUMENT_DB_FILE_NAME)
        })
        .clone()
}

fn with_document_service<T>(
    f: impl FnOnce(&mut SessionService<'_>) -> T,
) -> Result<SessionOutcome<T>, String> {
    let mut session = SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let db_path = resolve_document_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("document DB open failed: {err}"))?;
    let store = SqliteSnapshotStore::with_default_key(&conn)
        .map_err(|err| format!("document store init failed: {err}"))?;

    let mut service = match session.take() {
        Some(state) => DocumentService::resume(store, state.document, state.persisted),
        None => DocumentService::restore_or_seed(store),
    };
    let value = f(&mut service);
    let persisted = service.is_persisted();
    if !persisted {
        warn!("event=session_unsaved module=ffi status=pending");
    }
    *session = Some(SessionState {
        document: service.document().clone(),
        persisted,
    });
    Ok(SessionOutcome { value, persisted })
}

fn mutation_response(
    result: Result<SessionOutcome<bool>, String>,
    operation: &str,
) -> DocumentActionResponse {
    match result {
        Ok(outcome) if outcome.value => {
            DocumentActionResponse::applied(true, outcome.persisted, "Document updated.")
        }
        Ok(outcome) => DocumentActionResponse::applied(false, outcome.persisted, "No changes."),
        Err(err) => {
            warn!("event={operation} module=ffi status=error");
            DocumentActionResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn json_response(result: Result<String, String>, operation: &str) -> DocumentJsonResponse {
    match result {
        Ok(json) => DocumentJsonResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Err(err) => {
            warn!("event={operation} module=ffi status=error");
            DocumentJsonResponse {
                ok: false,
                json: String::new(),
                message: format!("{operation} failed: {err}"),
            }
        }
    }
}
