//! Core graph document engine for MindTime.
//! This crate is the single source of truth for mindmap invariants.

pub mod db;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod repo;
pub mod service;

pub use exchange::{
    deserialize, export_to_file, import_file, read_import_file, sample_document,
    sample_exchange_document, serialize, suggested_file_name, ExchangeDocument, ExchangeError,
    ExchangeMetadata, ImportedDocument, FORMAT_VERSION,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Document, IntegrityIssue, SEED_NODE_ID};
pub use model::edge::{Edge, EdgeId};
pub use model::node::{
    FieldParseError, Node, NodeData, NodeField, NodeFieldUpdate, NodeId, Position,
};
pub use mutation::{IdGenerator, UuidIdGenerator};
pub use repo::snapshot_repo::{
    PersistedSnapshot, SnapshotRepoError, SnapshotRepoResult, SnapshotStore,
    SqliteSnapshotStore, DEFAULT_SNAPSHOT_KEY,
};
pub use service::document_service::{DocumentOrigin, DocumentService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
