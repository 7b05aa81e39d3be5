//! Pure document mutation engine.
//!
//! # Responsibility
//! - Resolve UI intents into a new document snapshot.
//! - Keep every state transition side-effect free so callers can persist
//!   each returned snapshot without dirty tracking.
//!
//! # Invariants
//! - Operations referencing a missing node return a document equal to input.
//! - Deleting a node removes every edge touching it and nothing else.
//! - Color propagation writes each reachable node at most once and
//!   terminates on cyclic graphs.

use std::collections::HashSet;
use uuid::Uuid;

use crate::model::document::Document;
use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Node, NodeFieldUpdate, NodeId, Position, NEW_NODE_LABEL};

/// Source of fresh node and edge identifiers.
pub trait IdGenerator {
    /// Issues an id not used by any node of the current document.
    fn next_node_id(&mut self) -> NodeId;
    /// Issues an id not used by any edge of the current document.
    fn next_edge_id(&mut self) -> EdgeId;
}

/// Random UUIDv4 id generator used in production sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_node_id(&mut self) -> NodeId {
        Uuid::new_v4().to_string()
    }

    fn next_edge_id(&mut self) -> EdgeId {
        Uuid::new_v4().to_string()
    }
}

/// Replaces one payload field on one node.
///
/// No cross-field validation is applied (an `endDate` before `startDate` is
/// accepted).
pub fn update_node_field(doc: &Document, node_id: &str, update: NodeFieldUpdate) -> Document {
    if !doc.contains_node(node_id) {
        return doc.clone();
    }
    let mut next = doc.clone();
    for node in next.nodes.iter_mut().filter(|node| node.id == node_id) {
        node.data.apply(update.clone());
    }
    next
}

/// Moves one node to `position`.
pub fn move_node(doc: &Document, node_id: &str, position: Position) -> Document {
    let mut next = doc.clone();
    for node in next.nodes.iter_mut().filter(|node| node.id == node_id) {
        node.position = position;
    }
    next
}

/// Appends a default node at `position` plus an edge from `source_id` to it.
///
/// Returns the new document and the created node id, or an unchanged
/// document and `None` when `source_id` does not exist.
pub fn create_connected_node(
    doc: &Document,
    source_id: &str,
    position: Position,
    ids: &mut impl IdGenerator,
) -> (Document, Option<NodeId>) {
    if !doc.contains_node(source_id) {
        return (doc.clone(), None);
    }

    let node_id = ids.next_node_id();
    let edge_id = ids.next_edge_id();
    let mut next = doc.clone();
    next.nodes
        .push(Node::new(node_id.clone(), NEW_NODE_LABEL, position));
    next.edges
        .push(Edge::new(edge_id, source_id, node_id.clone()));
    (next, Some(node_id))
}

/// Appends an edge between two existing nodes.
///
/// Calling twice for the same pair yields two parallel edges. Returns an
/// unchanged document when either endpoint is missing.
pub fn connect_existing(
    doc: &Document,
    source_id: &str,
    target_id: &str,
    ids: &mut impl IdGenerator,
) -> Document {
    if !doc.contains_node(source_id) || !doc.contains_node(target_id) {
        return doc.clone();
    }
    let mut next = doc.clone();
    next.edges
        .push(Edge::new(ids.next_edge_id(), source_id, target_id));
    next
}

/// Removes one node and every edge touching it.
///
/// Former children stay in the document as roots.
pub fn delete_node(doc: &Document, node_id: &str) -> Document {
    if !doc.contains_node(node_id) {
        return doc.clone();
    }
    Document {
        nodes: doc
            .nodes
            .iter()
            .filter(|node| node.id != node_id)
            .cloned()
            .collect(),
        edges: doc
            .edges
            .iter()
            .filter(|edge| !edge.touches(node_id))
            .cloned()
            .collect(),
    }
}

/// Sets `backgroundColor` on `node_id` and its whole descendant subtree.
pub fn propagate_color(doc: &Document, node_id: &str, color: &str) -> Document {
    if !doc.contains_node(node_id) {
        return doc.clone();
    }

    let mut targets: HashSet<NodeId> = doc.descendants_of(node_id).into_iter().collect();
    targets.insert(node_id.to_string());

    let mut next = doc.clone();
    for node in next
        .nodes
        .iter_mut()
        .filter(|node| targets.contains(&node.id))
    {
        node.data.background_color = color.to_string();
    }
    next
}
