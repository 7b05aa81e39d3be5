//! Topic node domain model.
//!
//! # Responsibility
//! - Define the canonical node record shared by persistence and exchange.
//! - Address single payload fields for edit events raised by the UI layer.
//!
//! # Invariants
//! - `id` is stable and unique within one document.
//! - Node records carry data only; renderer callbacks never live here.
//! - Wire field names are camelCase (`startDate`, `backgroundColor`, ...).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of a node within one document.
pub type NodeId = String;

/// Background color assigned to freshly created nodes.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Label given to nodes created from a drag-connect gesture.
pub const NEW_NODE_LABEL: &str = "New Node";

/// Canvas position. No range constraints; a missing coordinate reads as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Editable payload of one topic node.
///
/// Missing fields deserialize to their defaults so that older or hand-written
/// documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeData {
    pub label: String,
    pub description: String,
    /// ISO 8601 date or empty. Not ordered against `end_date`.
    pub start_date: String,
    /// ISO 8601 date or empty.
    pub end_date: String,
    /// Hex color string.
    pub background_color: String,
    pub completed: bool,
    /// Short glyph or emoji.
    pub icon: String,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            label: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            completed: false,
            icon: String::new(),
        }
    }
}

impl NodeData {
    /// Creates a default payload with the given label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Applies one field replacement in place.
    pub fn apply(&mut self, update: NodeFieldUpdate) {
        match update {
            NodeFieldUpdate::Label(value) => self.label = value,
            NodeFieldUpdate::Description(value) => self.description = value,
            NodeFieldUpdate::StartDate(value) => self.start_date = value,
            NodeFieldUpdate::EndDate(value) => self.end_date = value,
            NodeFieldUpdate::BackgroundColor(value) => self.background_color = value,
            NodeFieldUpdate::Completed(value) => self.completed = value,
            NodeFieldUpdate::Icon(value) => self.icon = value,
        }
    }
}

/// Topic node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    /// Creates a node with default payload apart from `label`.
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData::labeled(label),
        }
    }
}

/// Payload field names as used on the wire and in UI edit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    Label,
    Description,
    StartDate,
    EndDate,
    BackgroundColor,
    Completed,
    Icon,
}

impl NodeField {
    /// Returns the camelCase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Description => "description",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::BackgroundColor => "backgroundColor",
            Self::Completed => "completed",
            Self::Icon => "icon",
        }
    }
}

impl Display for NodeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeField {
    type Err = FieldParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "label" => Ok(Self::Label),
            "description" => Ok(Self::Description),
            "startDate" => Ok(Self::StartDate),
            "endDate" => Ok(Self::EndDate),
            "backgroundColor" => Ok(Self::BackgroundColor),
            "completed" => Ok(Self::Completed),
            "icon" => Ok(Self::Icon),
            other => Err(FieldParseError::UnknownField(other.to_string())),
        }
    }
}

/// One typed payload replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFieldUpdate {
    Label(String),
    Description(String),
    StartDate(String),
    EndDate(String),
    BackgroundColor(String),
    Completed(bool),
    Icon(String),
}

impl NodeFieldUpdate {
    /// Builds an update from a field name and its raw string value.
    ///
    /// Text fields take the value verbatim. `completed` accepts
    /// `true`/`false`, case-insensitive.
    ///
    /// # Errors
    /// - `UnknownField` when `field` is not a payload field name.
    /// - `InvalidBool` when `completed` gets a non-boolean value.
    pub fn parse(field: &str, raw: &str) -> Result<Self, FieldParseError> {
        let field = field.parse::<NodeField>()?;
        let update = match field {
            NodeField::Label => Self::Label(raw.to_string()),
            NodeField::Description => Self::Description(raw.to_string()),
            NodeField::StartDate => Self::StartDate(raw.to_string()),
            NodeField::EndDate => Self::EndDate(raw.to_string()),
            NodeField::BackgroundColor => Self::BackgroundColor(raw.to_string()),
            NodeField::Icon => Self::Icon(raw.to_string()),
            NodeField::Completed => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Self::Completed(true),
                "false" => Self::Completed(false),
                _ => return Err(FieldParseError::InvalidBool(raw.to_string())),
            },
        };
        Ok(update)
    }

    /// Returns the field this update targets.
    pub fn field(&self) -> NodeField {
        match self {
            Self::Label(_) => NodeField::Label,
            Self::Description(_) => NodeField::Description,
            Self::StartDate(_) => NodeField::StartDate,
            Self::EndDate(_) => NodeField::EndDate,
            Self::BackgroundColor(_) => NodeField::BackgroundColor,
            Self::Completed(_) => NodeField::Completed,
            Self::Icon(_) => NodeField::Icon,
        }
    }
}

/// Errors from parsing UI field edit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    /// Field name does not match any payload field.
    UnknownField(String),
    /// `completed` value is not a boolean literal.
    InvalidBool(String),
}

impl Display for FieldParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown node field `{name}`"),
            Self::InvalidBool(value) => {
                write!(f, "invalid boolean `{value}` for field `completed`")
            }
        }
    }
}

impl Error for FieldParseError {}

#[cfg(test)]
mod tests {
    use super::{FieldParseError, NodeData, NodeField, NodeFieldUpdate};

    #[test]
    fn default_payload_is_white_and_open() {
        let data = NodeData::default();
        assert_eq!(data.background_color, "#ffffff");
        assert!(!data.completed);
        assert!(data.label.is_empty());
    }

    #[test]
    fn parse_accepts_wire_names() {
        assert_eq!(
            NodeFieldUpdate::parse("startDate", "2026-01-02").unwrap(),
            NodeFieldUpdate::StartDate("2026-01-02".to_string())
        );
        assert_eq!(
            NodeFieldUpdate::parse("completed", " TRUE ").unwrap(),
            NodeFieldUpdate::Completed(true)
        );
        assert_eq!(
            "backgroundColor".parse::<NodeField>().unwrap(),
            NodeField::BackgroundColor
        );
    }

    #[test]
    fn parse_rejects_unknown_field_and_bad_bool() {
        assert_eq!(
            NodeFieldUpdate::parse("colour", "#000").unwrap_err(),
            FieldParseError::UnknownField("colour".to_string())
        );
        assert_eq!(
            NodeFieldUpdate::parse("completed", "yes").unwrap_err(),
            FieldParseError::InvalidBool("yes".to_string())
        );
    }

    #[test]
    fn field_name_roundtrips_through_display() {
        for field in [
            NodeField::Label,
            NodeField::Description,
            NodeField::StartDate,
            NodeField::EndDate,
            NodeField::BackgroundColor,
            NodeField::Completed,
            NodeField::Icon,
        ] {
            assert_eq!(field.to_string().parse::<NodeField>().unwrap(), field);
        }
    }
}
