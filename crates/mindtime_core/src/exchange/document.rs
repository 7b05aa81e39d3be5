//! Portable exchange document encoding and validation.
//!
//! # Invariants
//! - Validation runs in a fixed order and stops at the first failure.
//! - A failed import never yields partial nodes or edges.
//! - `nodes`/`edges` survive a serialize/deserialize cycle unchanged;
//!   `exportDate` and `version` are regenerated on every export.

use crate::model::document::Document;
use crate::model::edge::Edge;
use crate::model::node::Node;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Exchange format version written by this build.
pub const FORMAT_VERSION: &str = "1.0.0";
/// Title used when an export has none.
pub const DEFAULT_TITLE: &str = "Untitled MindMap";

/// Errors from exchange encoding, decoding and file transport.
#[derive(Debug)]
pub enum ExchangeError {
    /// Input text is not JSON.
    Parse(String),
    /// Input is not an object with `nodes` and `metadata`.
    InvalidFormat,
    /// `nodes` is not a sequence.
    InvalidNodes,
    /// `edges` is missing or not a sequence.
    InvalidEdges,
    /// A node lacks `id`, `data` or `position`, or has malformed values.
    InvalidNodeStructure,
    /// An edge lacks `id`, `source` or `target`.
    InvalidEdgeStructure,
    /// Import file could not be read.
    ReadFailed(std::io::Error),
    /// Export file could not be written.
    WriteFailed(std::io::Error),
    /// Document could not be encoded.
    Serialize(serde_json::Error),
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(detail) => write!(f, "Failed to parse configuration file: {detail}"),
            Self::InvalidFormat => write!(f, "Invalid mindmap configuration file format"),
            Self::InvalidNodes => write!(f, "Invalid nodes data in configuration file"),
            Self::InvalidEdges => write!(f, "Invalid edges data in configuration file"),
            Self::InvalidNodeStructure => {
                write!(f, "Invalid node structure in configuration file")
            }
            Self::InvalidEdgeStructure => {
                write!(f, "Invalid edge structure in configuration file")
            }
            Self::ReadFailed(_) => write!(f, "Failed to read the file"),
            Self::WriteFailed(err) => write!(f, "Failed to write the file: {err}"),
            Self::Serialize(err) => write!(f, "Failed to encode configuration file: {err}"),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadFailed(err) | Self::WriteFailed(err) => Some(err),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl ExchangeError {
    /// Stable log code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "exchange_parse_failed",
            Self::InvalidFormat => "exchange_invalid_format",
            Self::InvalidNodes => "exchange_invalid_nodes",
            Self::InvalidEdges => "exchange_invalid_edges",
            Self::InvalidNodeStructure => "exchange_invalid_node",
            Self::InvalidEdgeStructure => "exchange_invalid_edge",
            Self::ReadFailed(_) => "exchange_read_failed",
            Self::WriteFailed(_) => "exchange_write_failed",
            Self::Serialize(_) => "exchange_encode_failed",
        }
    }
}

/// Descriptive block attached to every exported document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeMetadata {
    /// RFC 3339 UTC export time.
    pub export_date: String,
    pub version: String,
    pub title: String,
    pub description: String,
}

/// Self-describing exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: ExchangeMetadata,
}

impl ExchangeDocument {
    /// Renders 2-space indented JSON text.
    pub fn to_json_pretty(&self) -> Result<String, ExchangeError> {
        serde_json::to_string_pretty(self).map_err(ExchangeError::Serialize)
    }

    pub fn document(&self) -> Document {
        Document::new(self.nodes.clone(), self.edges.clone())
    }
}

/// Validated import result handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: ExchangeMetadata,
}

impl ImportedDocument {
    pub fn into_document(self) -> Document {
        Document::new(self.nodes, self.edges)
    }
}

/// Wraps `doc` with fresh export metadata.
///
/// A blank or absent title falls back to [`DEFAULT_TITLE`]; a blank or absent
/// description becomes empty.
pub fn serialize(doc: &Document, title: Option<&str>, description: Option<&str>) -> ExchangeDocument {
    let title = title
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    ExchangeDocument {
        nodes: doc.nodes.clone(),
        edges: doc.edges.clone(),
        metadata: ExchangeMetadata {
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: FORMAT_VERSION.to_string(),
            title,
            description: description.unwrap_or_default().to_string(),
        },
    }
}

/// Parses and validates exchange text.
///
/// # Errors
/// Checks run in this order and the first failure is returned:
/// 1. JSON syntax (`Parse`).
/// 2. `nodes` and `metadata` present (`InvalidFormat`).
/// 3. `nodes` is an array (`InvalidNodes`).
/// 4. `edges` is present and an array (`InvalidEdges`).
/// 5. every node has `id`, `data`, `position` and decodes (`InvalidNodeStructure`).
///    Payload fields are read leniently: `null` takes the default, numbers and
///    booleans in text fields are stringified, and `completed` is truthiness.
///    A missing coordinate is `0`.
/// 6. every edge has non-empty `id`, `source`, `target` (`InvalidEdgeStructure`).
pub fn deserialize(text: &str) -> Result<ImportedDocument, ExchangeError> {
    match validate(text) {
        Ok(imported) => {
            info!(
                "event=exchange_import module=exchange status=ok nodes={} edges={} version={}",
                imported.nodes.len(),
                imported.edges.len(),
                imported.metadata.version
            );
            Ok(imported)
        }
        Err(err) => {
            warn!(
                "event=exchange_import module=exchange status=rejected error_code={}",
                err.code()
            );
            Err(err)
        }
    }
}

fn validate(text: &str) -> Result<ImportedDocument, ExchangeError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| ExchangeError::Parse(err.to_string()))?;

    let field = |name: &str| root.get(name).filter(|value| is_truthy(value));
    let (Some(nodes), Some(metadata)) = (field("nodes"), field("metadata")) else {
        return Err(ExchangeError::InvalidFormat);
    };

    let nodes = nodes.as_array().ok_or(ExchangeError::InvalidNodes)?;
    // An absent `edges` section is reported as bad edge data, not as a
    // format error.
    let edges = field("edges")
        .and_then(Value::as_array)
        .ok_or(ExchangeError::InvalidEdges)?;

    let nodes = nodes
        .iter()
        .map(decode_node)
        .collect::<Option<Vec<_>>>()
        .ok_or(ExchangeError::InvalidNodeStructure)?;
    let edges = edges
        .iter()
        .map(decode_edge)
        .collect::<Option<Vec<_>>>()
        .ok_or(ExchangeError::InvalidEdgeStructure)?;

    Ok(ImportedDocument {
        nodes,
        edges,
        metadata: decode_metadata(metadata),
    })
}

fn decode_node(value: &Value) -> Option<Node> {
    let has_shape = non_empty_str(value.get("id")).is_some()
        && value.get("data").is_some_and(is_truthy)
        && value.get("position").is_some_and(is_truthy);
    if !has_shape {
        return None;
    }
    let mut node = value.clone();
    if let Some(data) = node.get_mut("data").and_then(Value::as_object_mut) {
        relax_payload(data);
    }
    serde_json::from_value(node).ok()
}

/// Coerces loosely typed payload values into the shapes `NodeData` expects.
/// Objects and arrays in text fields are left as-is and fail decoding.
fn relax_payload(data: &mut Map<String, Value>) {
    data.retain(|_, value| !value.is_null());
    for (name, value) in data.iter_mut() {
        if name == "completed" {
            *value = Value::Bool(is_truthy(value));
        } else if value.is_number() || value.is_boolean() {
            *value = Value::String(value.to_string());
        }
    }
}

fn decode_edge(value: &Value) -> Option<Edge> {
    Some(Edge::new(
        non_empty_str(value.get("id"))?,
        non_empty_str(value.get("source"))?,
        non_empty_str(value.get("target"))?,
    ))
}

/// Reads metadata leniently: non-string or missing values become empty.
fn decode_metadata(value: &Value) -> ExchangeMetadata {
    let text = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    ExchangeMetadata {
        export_date: text("exportDate"),
        version: text("version"),
        title: text("title"),
        description: text("description"),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Presence test matching the loose checks of hand-written files: `null`,
/// `false`, `0` and `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
