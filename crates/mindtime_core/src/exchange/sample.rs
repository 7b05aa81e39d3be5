//! Canonical onboarding example.

use super::document::{ExchangeDocument, ExchangeMetadata, FORMAT_VERSION};
use crate::model::document::Document;
use crate::model::edge::Edge;
use crate::model::node::{Node, NodeData, Position};
use chrono::{SecondsFormat, Utc};

/// Title carried by the sample exchange document.
pub const SAMPLE_TITLE: &str = "Sample MindMap";

fn topic(id: &str, data: NodeData, x: f64, y: f64) -> Node {
    Node {
        id: id.to_string(),
        position: Position::new(x, y),
        data,
    }
}

/// Returns the fixed 3-node, 2-edge example graph.
pub fn sample_document() -> Document {
    let root = NodeData {
        description: "This is the central topic of your mindmap".to_string(),
        icon: "🎯".to_string(),
        ..NodeData::labeled("Main Topic")
    };
    let first = NodeData {
        description: "First branch of ideas".to_string(),
        background_color: "#e3f2fd".to_string(),
        icon: "⭐".to_string(),
        ..NodeData::labeled("Subtopic 1")
    };
    let second = NodeData {
        description: "Second branch of ideas".to_string(),
        background_color: "#f3e5f5".to_string(),
        completed: true,
        icon: "📝".to_string(),
        ..NodeData::labeled("Subtopic 2")
    };

    Document::new(
        vec![
            topic("1", root, 250.0, 100.0),
            topic("2", first, 100.0, 200.0),
            topic("3", second, 400.0, 200.0),
        ],
        vec![Edge::new("e1-2", "1", "2"), Edge::new("e1-3", "1", "3")],
    )
}

/// Returns the sample graph wrapped as an exchange document.
pub fn sample_exchange_document() -> ExchangeDocument {
    let doc = sample_document();
    ExchangeDocument {
        nodes: doc.nodes,
        edges: doc.edges,
        metadata: ExchangeMetadata {
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: FORMAT_VERSION.to_string(),
            title: SAMPLE_TITLE.to_string(),
            description: "A sample mindmap to get you started".to_string(),
        },
    }
}
