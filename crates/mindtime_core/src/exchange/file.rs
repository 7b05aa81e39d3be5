//! File transport for exchange documents.
//!
//! # Invariants
//! - `import_file` invokes exactly one of its continuations, once.
//! - Read failures surface as `ExchangeError::ReadFailed` regardless of cause.

use super::document::{deserialize, serialize, ExchangeDocument, ExchangeError, ImportedDocument};
use crate::model::document::Document;
use chrono::NaiveDate;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid slug regex"));

/// Suggests `mindmap-<slug>-<yyyy-mm-dd>.json` for an export.
///
/// Every non-alphanumeric character of `title` becomes `_` and the result is
/// lowercased; a blank or absent title yields `export`.
pub fn suggested_file_name(title: Option<&str>, date: NaiveDate) -> String {
    let slug = title
        .map(|value| NON_ALNUM_RE.replace_all(value, "_").to_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "export".to_string());
    format!("mindmap-{slug}-{}.json", date.format("%Y-%m-%d"))
}

/// Writes `doc` as pretty exchange JSON to `path`.
///
/// Returns the exported document so callers can show its metadata.
pub fn export_to_file(
    path: impl AsRef<Path>,
    doc: &Document,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<ExchangeDocument, ExchangeError> {
    let path = path.as_ref();
    let exported = serialize(doc, title, description);
    let text = exported.to_json_pretty()?;
    if let Err(err) = std::fs::write(path, text) {
        error!(
            "event=exchange_export module=exchange status=error error_code=exchange_write_failed error={}",
            err
        );
        return Err(ExchangeError::WriteFailed(err));
    }
    info!(
        "event=exchange_export module=exchange status=ok nodes={} edges={}",
        exported.nodes.len(),
        exported.edges.len()
    );
    Ok(exported)
}

/// Reads and validates an exchange file on the calling thread.
pub fn read_import_file(path: impl AsRef<Path>) -> Result<ImportedDocument, ExchangeError> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(|err| {
        error!(
            "event=exchange_read module=exchange status=error error_code=exchange_read_failed error={}",
            err
        );
        ExchangeError::ReadFailed(err)
    })?;
    deserialize(&text)
}

/// Reads and validates an exchange file on a worker thread.
///
/// Exactly one of `on_success` / `on_error` runs on the worker thread. There
/// is no cancellation; a second call starts an unrelated import.
pub fn import_file<S, E>(path: impl Into<PathBuf>, on_success: S, on_error: E) -> JoinHandle<()>
where
    S: FnOnce(ImportedDocument) + Send + 'static,
    E: FnOnce(ExchangeError) + Send + 'static,
{
    let path = path.into();
    std::thread::spawn(move || match read_import_file(&path) {
        Ok(imported) => on_success(imported),
        Err(err) => on_error(err),
    })
}
