//! Graph document model for mindmap topics.
//!
//! # Responsibility
//! - Define node, edge and document records shared by every core layer.
//! - Provide read-only structural queries over one document snapshot.
//!
//! # Invariants
//! - Node ids and edge ids are unique within a document.
//! - Edge endpoints should reference existing nodes; readers must tolerate
//!   dangling references without failing.

pub mod document;
pub mod edge;
pub mod node;
