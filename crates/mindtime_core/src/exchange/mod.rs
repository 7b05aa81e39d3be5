//! Portable document exchange.
//!
//! # Responsibility
//! - Encode a document plus title/description as versioned JSON.
//! - Strictly validate imported JSON before anything reaches the session.
//! - Move exchange documents to and from files, and provide the sample.
//!
//! # Invariants
//! - Imported data is returned to the caller, never applied here.
//! - Exchange records carry data only; runtime behavior is reattached by the
//!   caller.

pub mod document;
pub mod file;
pub mod sample;

pub use document::{
    deserialize, serialize, ExchangeDocument, ExchangeError, ExchangeMetadata, ImportedDocument,
    DEFAULT_TITLE, FORMAT_VERSION,
};
pub use file::{export_to_file, import_file, read_import_file, suggested_file_name};
pub use sample::{sample_document, sample_exchange_document, SAMPLE_TITLE};
