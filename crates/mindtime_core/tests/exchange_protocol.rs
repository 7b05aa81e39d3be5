use mindtime_core::{
    deserialize, export_to_file, import_file, read_import_file, sample_document,
    sample_exchange_document, serialize, Document, Edge, ExchangeError, Node, NodeData, Position,
    FORMAT_VERSION,
};
use serde_json::json;
use std::sync::mpsc;
use std::time::Duration;

fn message(text: &str) -> String {
    deserialize(text).unwrap_err().to_string()
}

fn valid_node() -> serde_json::Value {
    json!({ "id": "1", "data": { "label": "Root" }, "position": { "x": 1.0, "y": 2.0 } })
}

#[test]
fn roundtrip_preserves_nodes_and_edges() {
    let mut doc = sample_document();
    doc.nodes.push(Node {
        id: "4".to_string(),
        position: Position::new(-12.5, 1e6),
        data: NodeData {
            start_date: "2026-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            ..NodeData::labeled("Unicode ✓ «quoted»")
        },
    });
    doc.edges.push(Edge::new("loop", "4", "4"));
    doc.edges.push(Edge::new("dup", "1", "2"));

    let text = serialize(&doc, Some("Plan"), Some("desc"))
        .to_json_pretty()
        .unwrap();
    let imported = deserialize(&text).unwrap();

    assert_eq!(imported.nodes, doc.nodes);
    assert_eq!(imported.edges, doc.edges);
    assert_eq!(imported.metadata.title, "Plan");
    assert_eq!(imported.metadata.description, "desc");
    assert_eq!(imported.metadata.version, FORMAT_VERSION);
}

#[test]
fn roundtrip_of_empty_document() {
    let text = serialize(&Document::default(), None, None)
        .to_json_pretty()
        .unwrap();
    let imported = deserialize(&text).unwrap();
    assert!(imported.nodes.is_empty());
    assert!(imported.edges.is_empty());
    assert_eq!(imported.metadata.title, "Untitled MindMap");
}

#[test]
fn missing_nodes_or_metadata_is_format_error() {
    let text = json!({ "nodes": [], "edges": [] }).to_string();
    assert_eq!(message(&text), "Invalid mindmap configuration file format");

    let text = json!({ "edges": [], "metadata": {} }).to_string();
    assert_eq!(message(&text), "Invalid mindmap configuration file format");

    let text = json!({ "nodes": null, "edges": [], "metadata": {} }).to_string();
    assert_eq!(message(&text), "Invalid mindmap configuration file format");

    assert_eq!(message("[]"), "Invalid mindmap configuration file format");
}

#[test]
fn missing_or_non_array_edges_is_edges_error() {
    let text = json!({ "nodes": [], "metadata": {} }).to_string();
    assert!(matches!(deserialize(&text), Err(ExchangeError::InvalidEdges)));
    assert_eq!(message(&text), "Invalid edges data in configuration file");

    let text = json!({ "nodes": [], "edges": {"a": 1}, "metadata": {} }).to_string();
    assert_eq!(message(&text), "Invalid edges data in configuration file");
}

#[test]
fn non_array_nodes_is_checked_before_edges() {
    let text = json!({ "nodes": "x", "edges": "y", "metadata": {} }).to_string();
    assert!(matches!(deserialize(&text), Err(ExchangeError::InvalidNodes)));
    assert_eq!(message(&text), "Invalid nodes data in configuration file");
}

#[test]
fn node_structure_is_validated() {
    for node in [
        json!({ "data": {}, "position": { "x": 0, "y": 0 } }),
        json!({ "id": "", "data": {}, "position": { "x": 0, "y": 0 } }),
        json!({ "id": "1", "position": { "x": 0, "y": 0 } }),
        json!({ "id": "1", "data": {} }),
        json!({ "id": "1", "data": {}, "position": { "x": "left", "y": 0 } }),
    ] {
        let text = json!({ "nodes": [valid_node(), node], "edges": [], "metadata": {} }).to_string();
        assert_eq!(message(&text), "Invalid node structure in configuration file");
    }
}

#[test]
fn node_errors_take_precedence_over_edge_errors() {
    let text = json!({
        "nodes": [{ "id": "1" }],
        "edges": [{ "id": "e" }],
        "metadata": {}
    })
    .to_string();
    assert_eq!(message(&text), "Invalid node structure in configuration file");
}

#[test]
fn edge_structure_is_validated() {
    for edge in [
        json!({ "source": "1", "target": "1" }),
        json!({ "id": "e", "target": "1" }),
        json!({ "id": "e", "source": "1", "target": "" }),
    ] {
        let text = json!({ "nodes": [valid_node()], "edges": [edge], "metadata": {} }).to_string();
        assert_eq!(message(&text), "Invalid edge structure in configuration file");
    }
}

#[test]
fn missing_payload_fields_fall_back_to_defaults() {
    let text = json!({ "nodes": [valid_node()], "edges": [], "metadata": { "title": "T" } })
        .to_string();
    let imported = deserialize(&text).unwrap();
    let data = &imported.nodes[0].data;
    assert_eq!(data.label, "Root");
    assert_eq!(data.background_color, "#ffffff");
    assert!(!data.completed);
}

#[test]
fn dangling_edges_pass_protocol_validation() {
    let text = json!({
        "nodes": [valid_node()],
        "edges": [{ "id": "e", "source": "1", "target": "ghost" }],
        "metadata": {}
    })
    .to_string();
    let imported = deserialize(&text).unwrap();
    assert_eq!(imported.edges.len(), 1);
}

#[test]
fn export_writes_file_that_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindmap.json");
    let doc = sample_document();

    let exported = export_to_file(&path, &doc, Some("Sample"), None).unwrap();
    assert_eq!(exported.metadata.title, "Sample");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \""));

    let imported = read_import_file(&path).unwrap();
    assert_eq!(imported.into_document(), doc);
}

#[test]
fn sample_exchange_document_is_valid_input() {
    let sample = sample_exchange_document();
    assert_eq!(sample.metadata.title, "Sample MindMap");
    let imported = deserialize(&sample.to_json_pretty().unwrap()).unwrap();
    assert_eq!(imported.into_document(), sample_document());
}

#[test]
fn import_file_invokes_success_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.json");
    export_to_file(&path, &sample_document(), None, None).unwrap();

    let (tx, rx) = mpsc::channel();
    let error_tx = tx.clone();
    import_file(
        path,
        move |imported| tx.send(Ok(imported.nodes.len())).unwrap(),
        move |err| error_tx.send(Err(err.to_string())).unwrap(),
    )
    .join()
    .unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(3));
    assert!(rx.try_recv().is_err());
}

#[test]
fn import_file_reports_read_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let success_tx = tx.clone();

    import_file(
        dir.path().join("missing.json"),
        move |_| success_tx.send(Ok(())).unwrap(),
        move |err| tx.send(Err(err.to_string())).unwrap(),
    )
    .join()
    .unwrap();

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        Err("Failed to read the file".to_string())
    );
}

#[test]
fn import_file_reports_validation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"nodes": [], "metadata": {"title": "x"}}"#).unwrap();

    let (tx, rx) = mpsc::channel::<Result<(), String>>();
    let success_tx = tx.clone();
    import_file(
        path,
        move |_| success_tx.send(Ok(())).unwrap(),
        move |err| tx.send(Err(err.to_string())).unwrap(),
    )
    .join()
    .unwrap();

    assert_eq!(
        rx.recv().unwrap(),
        Err("Invalid edges data in configuration file".to_string())
    );
}
