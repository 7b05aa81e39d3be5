use mindtime_core::db::open_db_in_memory;
use mindtime_core::{
    deserialize, sample_document, Document, DocumentOrigin, DocumentService, IdGenerator,
    NodeFieldUpdate, PersistedSnapshot, Position, SnapshotStore, SqliteSnapshotStore,
};
use serde_json::json;
use std::cell::{Cell, RefCell};

/// In-memory store that records every save and can be switched to fail.
#[derive(Default)]
struct RecordingStore {
    saved: RefCell<Option<Document>>,
    save_calls: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl SnapshotStore for RecordingStore {
    fn key(&self) -> &str {
        "recording"
    }

    fn save(&self, document: &Document) -> bool {
        self.save_calls.set(self.save_calls.get() + 1);
        if self.fail_writes.get() {
            return false;
        }
        *self.saved.borrow_mut() = Some(document.clone());
        true
    }

    fn load(&self) -> Option<PersistedSnapshot> {
        self.saved
            .borrow()
            .as_ref()
            .map(PersistedSnapshot::capture)
    }

    fn clear(&self) -> bool {
        self.saved.borrow_mut().take();
        true
    }

    fn exists(&self) -> bool {
        self.saved.borrow().is_some()
    }
}

#[derive(Default)]
struct SequentialIds {
    next: u32,
}

impl IdGenerator for SequentialIds {
    fn next_node_id(&mut self) -> String {
        self.next += 1;
        format!("node-{}", self.next)
    }

    fn next_edge_id(&mut self) -> String {
        self.next += 1;
        format!("edge-{}", self.next)
    }
}

#[test]
fn empty_store_starts_from_seed() {
    let service = DocumentService::restore_or_seed(RecordingStore::default());
    assert_eq!(service.origin(), DocumentOrigin::Seed);
    assert_eq!(service.document(), &Document::seed());
    assert_eq!(service.store().save_calls.get(), 0);
}

#[test]
fn seed_scenario_persists_every_mutation() {
    let mut service =
        DocumentService::restore_or_seed_with_ids(RecordingStore::default(), SequentialIds::default());

    let child = service
        .create_connected_node("1", Position::new(100.0, 200.0))
        .unwrap();
    assert_eq!(child, "node-1");
    assert_eq!(service.document().nodes.len(), 2);
    assert_eq!(service.document().edges.len(), 1);
    assert_eq!(service.document().edges[0].source, "1");
    assert_eq!(service.document().edges[0].target, child);

    assert!(service.propagate_color("1", "#e3f2fd"));
    assert!(service
        .document()
        .nodes
        .iter()
        .all(|node| node.data.background_color == "#e3f2fd"));

    assert_eq!(service.store().save_calls.get(), 2);
    assert_eq!(
        service.store().saved.borrow().as_ref(),
        Some(service.document())
    );
}

#[test]
fn noop_intents_are_not_saved() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());

    assert!(service.create_connected_node("missing", Position::default()).is_none());
    assert!(!service.update_node_field("missing", NodeFieldUpdate::Label("x".to_string())));
    assert!(!service.connect_existing("1", "missing"));
    assert!(!service.delete_node("missing"));
    assert!(!service.propagate_color("missing", "#000000"));
    assert!(!service.move_node("missing", Position::new(1.0, 1.0)));

    assert_eq!(service.document(), &Document::seed());
    assert_eq!(service.store().save_calls.get(), 0);
}

#[test]
fn failed_save_keeps_in_memory_changes() {
    let store = RecordingStore::default();
    store.fail_writes.set(true);
    let mut service = DocumentService::restore_or_seed(store);

    assert!(service.update_node_field("1", NodeFieldUpdate::Completed(true)));
    assert!(service.document().nodes[0].data.completed);
    assert_eq!(service.store().save_calls.get(), 1);
    assert!(service.store().saved.borrow().is_none());
    assert!(!service.is_persisted());
}

#[test]
fn later_save_catches_up_after_failure() {
    let store = RecordingStore::default();
    store.fail_writes.set(true);
    let mut service =
        DocumentService::restore_or_seed_with_ids(store, SequentialIds::default());

    let child = service
        .create_connected_node("1", Position::new(10.0, 20.0))
        .unwrap();
    assert!(!service.is_persisted());

    service.store().fail_writes.set(false);
    assert!(service.update_node_field(&child, NodeFieldUpdate::Label("Later".to_string())));
    assert!(service.is_persisted());

    let saved = service.store().saved.borrow().clone().unwrap();
    assert_eq!(saved.nodes.len(), 2);
    assert_eq!(saved.find_node(&child).unwrap().data.label, "Later");
}

#[test]
fn resume_keeps_document_without_reading_store() {
    let store = RecordingStore::default();
    store.save(&sample_document());
    let mut working = Document::seed();
    working.nodes[0].data.label = "Unsaved".to_string();

    let service = DocumentService::resume(store, working.clone(), false);
    assert_eq!(service.origin(), DocumentOrigin::Resumed);
    assert_eq!(service.document(), &working);
    assert!(!service.is_persisted());
}

#[test]
fn delete_keeps_children_as_roots() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());
    service.load_sample();

    assert!(service.delete_node("1"));
    let doc = service.document();
    assert_eq!(doc.nodes.len(), 2);
    assert!(doc.edges.is_empty());
    assert!(doc.find_node("2").is_some());
    assert!(doc.find_node("3").is_some());
}

#[test]
fn import_prunes_dangling_edges_and_reports_metadata() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());
    let text = json!({
        "nodes": [
            { "id": "a", "data": { "label": "A" }, "position": { "x": 0, "y": 0 } },
            { "id": "b", "data": { "label": "B" }, "position": { "x": 0, "y": 0 } }
        ],
        "edges": [
            { "id": "ab", "source": "a", "target": "b" },
            { "id": "ax", "source": "a", "target": "ghost" }
        ],
        "metadata": { "title": "Imported", "version": "1.0.0" }
    })
    .to_string();

    let metadata = service.apply_import(deserialize(&text).unwrap());
    assert_eq!(metadata.title, "Imported");
    assert_eq!(service.origin(), DocumentOrigin::Imported);
    assert_eq!(service.document().edges.len(), 1);
    assert_eq!(service.document().edges[0].id, "ab");
    assert!(service.store().exists());
}

#[test]
fn rejected_import_leaves_document_untouched() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());
    service.load_sample();
    let before = service.document().clone();

    let result = deserialize(r#"{"nodes": [], "metadata": {}}"#);
    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid edges data in configuration file"
    );
    assert_eq!(service.document(), &before);
}

#[test]
fn reset_clears_store_and_returns_to_seed() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());
    service.load_sample();
    assert!(service.store().exists());

    service.reset_to_seed();
    assert_eq!(service.document(), &Document::seed());
    assert!(!service.store().exists());
}

#[test]
fn export_wraps_current_document() {
    let mut service = DocumentService::restore_or_seed(RecordingStore::default());
    service.load_sample();

    let exported = service.export(Some("Plan"), None);
    assert_eq!(exported.document(), sample_document());
    assert_eq!(exported.metadata.title, "Plan");
}

#[test]
fn sqlite_session_restores_previous_state() {
    let conn = open_db_in_memory().unwrap();

    {
        let store = SqliteSnapshotStore::with_default_key(&conn).unwrap();
        let mut service = DocumentService::restore_or_seed(store);
        service.update_node_field("1", NodeFieldUpdate::Icon("🧠".to_string()));
        service.update_node_field("1", NodeFieldUpdate::EndDate("2026-12-31".to_string()));
    }

    let store = SqliteSnapshotStore::with_default_key(&conn).unwrap();
    let service = DocumentService::restore_or_seed(store);
    assert_eq!(service.origin(), DocumentOrigin::Restored);
    let root = service.document().find_node("1").unwrap();
    assert_eq!(root.data.icon, "🧠");
    assert_eq!(root.data.end_date, "2026-12-31");
}
