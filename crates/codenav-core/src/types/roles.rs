//! Occurrence roles and result-bucket kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a symbol at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceRole {
    Definition,
    Reference,
    Implementation,
    Type,
}

impl OccurrenceRole {
    pub const ALL: [OccurrenceRole; 4] = [
        Self::Definition,
        Self::Reference,
        Self::Implementation,
        Self::Type,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Reference => "reference",
            Self::Implementation => "implementation",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for OccurrenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccurrenceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "definition" => Ok(Self::Definition),
            "reference" => Ok(Self::Reference),
            "implementation" => Ok(Self::Implementation),
            "type" => Ok(Self::Type),
            other => Err(format!("unknown occurrence role: {other}")),
        }
    }
}

/// Which result bucket a `textDocument/*` edge points a result set at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Definitions,
    References,
    TypeDefinition,
    Implementation,
}

impl BucketKind {
    /// The `textDocument/*` edge label that assigns this bucket.
    pub fn edge_label(&self) -> &'static str {
        match self {
            Self::Definitions => "textDocument/definition",
            Self::References => "textDocument/references",
            Self::TypeDefinition => "textDocument/typeDefinition",
            Self::Implementation => "textDocument/implementation",
        }
    }
}
