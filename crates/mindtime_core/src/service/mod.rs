//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate mutation, persistence and exchange into session-level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod document_service;
