//! Graph document and read-only queries.
//!
//! # Responsibility
//! - Hold one snapshot of nodes and edges.
//! - Answer structural queries (lookup, children, descendants, integrity).
//!
//! # Invariants
//! - The edge list is the only source of parent/child relations.
//! - Queries never mutate; every state change goes through `crate::mutation`.
//! - Descendant traversal is cycle-safe and tolerates dangling edge ids.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId, Position};

/// Id of the single node in a fresh session document.
pub const SEED_NODE_ID: &str = "1";
/// Label of the single node in a fresh session document.
pub const SEED_NODE_LABEL: &str = "Yoffix";

/// One immutable snapshot of the mindmap graph.
///
/// Node order is display order only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Structural problem found by [`Document::integrity_issues`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// More than one node shares this id.
    DuplicateNodeId(NodeId),
    /// More than one edge shares this id.
    DuplicateEdgeId(EdgeId),
    /// Edge endpoint does not reference an existing node.
    DanglingEdge { edge_id: EdgeId, missing: NodeId },
}

impl Document {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Built-in single-node document used when nothing was restored.
    pub fn seed() -> Self {
        Self {
            nodes: vec![Node::new(
                SEED_NODE_ID,
                SEED_NODE_LABEL,
                Position::new(250.0, 5.0),
            )],
            edges: Vec::new(),
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    /// Returns edges whose source is `id`, in edge order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    /// Returns ids of every node reachable from `id` via outgoing edges.
    ///
    /// The start node itself is excluded, even when a cycle leads back to it.
    /// Each reachable id appears once, in depth-first discovery order. Targets
    /// that do not exist as nodes are skipped.
    ///
    /// Runs in O(V + E): adjacency is built once, and a visited set bounds
    /// each node to one expansion.
    pub fn descendants_of(&self, id: &str) -> Vec<NodeId> {
        let present: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);
        let mut order = Vec::new();
        let mut stack: Vec<&str> = adjacency
            .get(id)
            .map(|targets| targets.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if !present.contains(current) || !visited.insert(current) {
                continue;
            }
            order.push(current.to_string());
            if let Some(targets) = adjacency.get(current) {
                stack.extend(
                    targets
                        .iter()
                        .rev()
                        .filter(|target| !visited.contains(**target)),
                );
            }
        }
        order
    }

    /// Reports duplicate ids and dangling edge endpoints.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                issues.push(IntegrityIssue::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                issues.push(IntegrityIssue::DuplicateEdgeId(edge.id.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    issues.push(IntegrityIssue::DanglingEdge {
                        edge_id: edge.id.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        issues
    }

    /// Returns a copy without edges whose endpoints are missing.
    pub fn without_dangling_edges(&self) -> Self {
        let node_ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        Self {
            nodes: self.nodes.clone(),
            edges: self
                .edges
                .iter()
                .filter(|edge| {
                    node_ids.contains(edge.source.as_str())
                        && node_ids.contains(edge.target.as_str())
                })
                .cloned()
                .collect(),
        }
    }
}
