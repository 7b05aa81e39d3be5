//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define storage contracts consumed by the document service.
//! - Isolate SQLite query details from mutation and exchange logic.
//!
//! # Invariants
//! - Snapshot writes are write-through and never fail loudly.
//! - Malformed stored data is reported as absence, not as an error.

pub mod snapshot_repo;
