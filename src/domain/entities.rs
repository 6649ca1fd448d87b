//! Domain entities: construction specs, projection rows, edit modes

use serde::Deserialize;

use crate::domain::error::DomainError;

/// Declarative node specification for tree construction.
///
/// `original_value` defaults to `value` when omitted, matching the usual
/// case where a freshly loaded document carries no drift.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    pub value: f64,
    #[serde(default)]
    pub original_value: Option<f64>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// A TOML allocation document: a list of top-level `[[allocation]]` specs.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationDoc {
    #[serde(default)]
    pub allocation: Vec<NodeSpec>,
}

impl AllocationDoc {
    /// Parse a TOML document of node specs.
    pub fn from_toml(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content).map_err(|e| DomainError::SpecParse(e.to_string()))
    }
}

/// Depth-annotated row produced by the flattening projection.
///
/// Pre-order: a parent row comes immediately before its children's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub original_value: f64,
    pub variance: f64,
    pub depth: usize,
    pub leaf: bool,
}

/// How a raw input value is interpreted by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// `new = value + value * raw / 100`
    Percentage,
    /// `new = raw`
    Absolute,
}
