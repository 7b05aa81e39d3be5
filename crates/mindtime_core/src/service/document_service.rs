//! Mindmap session use-case service.
//!
//! # Responsibility
//! - Own the current document for one session.
//! - Route UI intents through the mutation engine.
//! - Persist every changed snapshot through the snapshot store.
//!
//! # Invariants
//! - Every mutation that changes the document is followed by exactly one
//!   `save` call; unchanged results are not saved.
//! - A failed save never rolls back the in-memory document; it is reported
//!   through `is_persisted()` until a later save succeeds.
//! - Imports replace the document only after full validation.

use crate::exchange::{
    sample_document, serialize, ExchangeDocument, ExchangeMetadata, ImportedDocument,
};
use crate::model::document::{Document, IntegrityIssue};
use crate::model::node::{NodeFieldUpdate, NodeId, Position};
use crate::mutation::{self, IdGenerator, UuidIdGenerator};
use crate::repo::snapshot_repo::SnapshotStore;
use log::{info, warn};

/// Where a session document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// Built-in single node seed.
    Seed,
    /// Restored persisted snapshot.
    Restored,
    /// Sample document.
    Sample,
    /// Validated exchange import.
    Imported,
    /// In-memory document carried over from an earlier session.
    Resumed,
}

/// Session facade over the mutation engine and a snapshot store.
pub struct DocumentService<S: SnapshotStore, G: IdGenerator = UuidIdGenerator> {
    store: S,
    ids: G,
    document: Document,
    origin: DocumentOrigin,
    persisted: bool,
}

impl<S: SnapshotStore> DocumentService<S> {
    /// Starts a session from the stored snapshot, or the seed when none.
    pub fn restore_or_seed(store: S) -> Self {
        Self::restore_or_seed_with_ids(store, UuidIdGenerator)
    }

    /// Continues working on `document` without reading the store.
    ///
    /// `persisted` tells whether the store already holds this document.
    pub fn resume(store: S, document: Document, persisted: bool) -> Self {
        Self::resume_with_ids(store, UuidIdGenerator, document, persisted)
    }
}

impl<S: SnapshotStore, G: IdGenerator> DocumentService<S, G> {
    /// Starts a session with a custom id generator.
    pub fn restore_or_seed_with_ids(store: S, ids: G) -> Self {
        let (document, origin) = match store.load() {
            Some(snapshot) => (snapshot.into_document(), DocumentOrigin::Restored),
            None => (Document::seed(), DocumentOrigin::Seed),
        };
        info!(
            "event=session_start module=service status=ok origin={:?} nodes={} edges={}",
            origin,
            document.nodes.len(),
            document.edges.len()
        );
        Self {
            store,
            ids,
            document,
            origin,
            persisted: true,
        }
    }

    /// Continues working on `document` with a custom id generator.
    pub fn resume_with_ids(store: S, ids: G, document: Document, persisted: bool) -> Self {
        Self {
            store,
            ids,
            document,
            origin: DocumentOrigin::Resumed,
            persisted,
        }
    }

    /// Current document snapshot.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn origin(&self) -> DocumentOrigin {
        self.origin
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether every change has reached the store. `false` after a failed
    /// save until a later write succeeds.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Replaces one payload field. Returns whether the document changed.
    pub fn update_node_field(&mut self, node_id: &str, update: NodeFieldUpdate) -> bool {
        let next = mutation::update_node_field(&self.document, node_id, update);
        self.commit(next, "update_node_field")
    }

    /// Repositions one node. Returns whether the document changed.
    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        let next = mutation::move_node(&self.document, node_id, position);
        self.commit(next, "move_node")
    }

    /// Creates a default node connected from `source_id`.
    ///
    /// Returns the new node id, or `None` when `source_id` is missing.
    pub fn create_connected_node(&mut self, source_id: &str, position: Position) -> Option<NodeId> {
        let (next, created) =
            mutation::create_connected_node(&self.document, source_id, position, &mut self.ids);
        self.commit(next, "create_connected_node");
        created
    }

    /// Connects two existing nodes. Returns whether the document changed.
    pub fn connect_existing(&mut self, source_id: &str, target_id: &str) -> bool {
        let next =
            mutation::connect_existing(&self.document, source_id, target_id, &mut self.ids);
        self.commit(next, "connect_existing")
    }

    /// Deletes one node and its edges. Returns whether the document changed.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let next = mutation::delete_node(&self.document, node_id);
        self.commit(next, "delete_node")
    }

    /// Colors a node and its descendants. Returns whether the document changed.
    pub fn propagate_color(&mut self, node_id: &str, color: &str) -> bool {
        let next = mutation::propagate_color(&self.document, node_id, color);
        self.commit(next, "propagate_color")
    }

    /// Replaces the document with the sample graph.
    pub fn load_sample(&mut self) {
        self.replace(sample_document(), DocumentOrigin::Sample);
    }

    /// Replaces the document with validated imported data.
    ///
    /// Edges whose endpoints are missing are dropped before the document is
    /// accepted. Returns the imported metadata.
    pub fn apply_import(&mut self, imported: ImportedDocument) -> ExchangeMetadata {
        let metadata = imported.metadata.clone();
        let document = imported.into_document();

        let dangling = document
            .integrity_issues()
            .iter()
            .filter(|issue| matches!(issue, IntegrityIssue::DanglingEdge { .. }))
            .count();
        let document = if dangling > 0 {
            warn!(
                "event=session_import module=service status=repaired dangling_endpoints={}",
                dangling
            );
            document.without_dangling_edges()
        } else {
            document
        };

        self.replace(document, DocumentOrigin::Imported);
        metadata
    }

    /// Clears the stored snapshot and restarts from the seed.
    pub fn reset_to_seed(&mut self) {
        self.persisted = self.store.clear();
        self.document = Document::seed();
        self.origin = DocumentOrigin::Seed;
        info!(
            "event=session_reset module=service status=ok persisted={}",
            self.persisted
        );
    }

    /// Encodes the current document for export.
    pub fn export(&self, title: Option<&str>, description: Option<&str>) -> ExchangeDocument {
        serialize(&self.document, title, description)
    }

    fn replace(&mut self, document: Document, origin: DocumentOrigin) {
        self.document = document;
        self.origin = origin;
        self.persisted = self.store.save(&self.document);
        info!(
            "event=session_replace module=service status=ok origin={:?} nodes={} edges={} persisted={}",
            origin,
            self.document.nodes.len(),
            self.document.edges.len(),
            self.persisted
        );
    }

    fn commit(&mut self, next: Document, operation: &'static str) -> bool {
        if next == self.document {
            info!("event={operation} module=service status=noop");
            return false;
        }
        self.document = next;
        self.persisted = self.store.save(&self.document);
        if !self.persisted {
            warn!("event={operation} module=service status=unsaved");
        }
        true
    }
}
