//! Decoding of one stream line into a typed vertex or edge.
//!
//! Only the fields the store uses are decoded; everything else on a record is
//! ignored. Labels this engine does not handle decode to `Other`.

use codenav_core::types::{BucketKind, Position, Span};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    /// Short description for error context, e.g. `"edge contains"`.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Vertex(v) => match v {
                Vertex::MetaData(_) => "vertex metaData",
                Vertex::Document(_) => "vertex document",
                Vertex::Range(_) => "vertex range",
                Vertex::ResultSet(_) => "vertex resultSet",
                Vertex::Moniker(_) => "vertex moniker",
                Vertex::HoverResult(_) => "vertex hoverResult",
                Vertex::PackageInformation(_) => "vertex packageInformation",
                Vertex::DefinitionResult(_)
                | Vertex::ReferenceResult(_)
                | Vertex::TypeDefinitionResult(_)
                | Vertex::ImplementationResult(_) => "vertex result bucket",
                Vertex::Other => "vertex",
            },
            Self::Edge(e) => match e {
                Edge::Contains(_) => "edge contains",
                Edge::Next(_) => "edge next",
                Edge::Moniker(_) => "edge moniker",
                Edge::PackageInformation(_) => "edge packageInformation",
                Edge::Definition(_) => "edge textDocument/definition",
                Edge::References(_) => "edge textDocument/references",
                Edge::TypeDefinition(_) => "edge textDocument/typeDefinition",
                Edge::Implementation(_) => "edge textDocument/implementation",
                Edge::Hover(_) => "edge textDocument/hover",
                Edge::Item(_) => "edge item",
                Edge::Other => "edge",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "label")]
pub enum Vertex {
    #[serde(rename = "metaData")]
    MetaData(MetaDataVertex),
    #[serde(rename = "document")]
    Document(DocumentVertex),
    #[serde(rename = "range")]
    Range(RangeVertex),
    #[serde(rename = "resultSet")]
    ResultSet(IdOnly),
    #[serde(rename = "moniker")]
    Moniker(MonikerVertex),
    #[serde(rename = "hoverResult")]
    HoverResult(HoverResultVertex),
    #[serde(rename = "packageInformation")]
    PackageInformation(PackageInformationVertex),
    #[serde(rename = "definitionResult")]
    DefinitionResult(IdOnly),
    #[serde(rename = "referenceResult")]
    ReferenceResult(IdOnly),
    #[serde(rename = "typeDefinitionResult")]
    TypeDefinitionResult(IdOnly),
    #[serde(rename = "implementationResult")]
    ImplementationResult(IdOnly),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "label")]
pub enum Edge {
    #[serde(rename = "contains")]
    Contains(ManyEdge),
    #[serde(rename = "next")]
    Next(OneEdge),
    #[serde(rename = "moniker")]
    Moniker(OneEdge),
    #[serde(rename = "packageInformation")]
    PackageInformation(OneEdge),
    #[serde(rename = "textDocument/definition")]
    Definition(OneEdge),
    #[serde(rename = "textDocument/references")]
    References(OneEdge),
    #[serde(rename = "textDocument/typeDefinition")]
    TypeDefinition(OneEdge),
    #[serde(rename = "textDocument/implementation")]
    Implementation(OneEdge),
    #[serde(rename = "textDocument/hover")]
    Hover(OneEdge),
    #[serde(rename = "item")]
    Item(ItemEdge),
    #[serde(other)]
    Other,
}

impl Edge {
    /// Bucket kind assigned by a `textDocument/*` result edge.
    pub fn bucket_kind(&self) -> Option<BucketKind> {
        match self {
            Self::Definition(_) => Some(BucketKind::Definitions),
            Self::References(_) => Some(BucketKind::References),
            Self::TypeDefinition(_) => Some(BucketKind::TypeDefinition),
            Self::Implementation(_) => Some(BucketKind::Implementation),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataVertex {
    pub version: Option<String>,
    pub project_root: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVertex {
    pub id: i64,
    pub uri: String,
    pub language_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeVertex {
    pub id: i64,
    pub start: Position,
    pub end: Position,
}

impl RangeVertex {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonikerVertex {
    pub id: i64,
    pub scheme: String,
    pub identifier: String,
    pub kind: Option<String>,
    pub package_information_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HoverResultVertex {
    pub id: i64,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Deserialize)]
pub struct PackageInformationVertex {
    pub id: i64,
    pub name: String,
    pub version: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneEdge {
    pub out_v: i64,
    pub in_v: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManyEdge {
    pub out_v: i64,
    #[serde(default)]
    pub in_vs: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEdge {
    pub out_v: i64,
    pub in_vs: Option<Vec<i64>>,
    pub in_v: Option<i64>,
    pub property: Option<String>,
}

impl ItemEdge {
    /// Target ids from `inVs`, falling back to a single `inV`.
    pub fn targets(&self) -> Vec<i64> {
        match (&self.in_vs, self.in_v) {
            (Some(many), _) => many.clone(),
            (None, Some(one)) => vec![one],
            (None, None) => Vec::new(),
        }
    }

    pub fn is_definitions(&self) -> bool {
        self.property.as_deref() == Some("definitions")
    }
}

/// Parse one stream line. Bytes that are not UTF-8 are a parse error.
pub fn parse_line(line: &[u8]) -> Result<Element, serde_json::Error> {
    serde_json::from_slice(line)
}

/// Flatten a hover payload to text.
///
/// Accepts `{contents: X}` or a bare `X`, where `X` is a string, a
/// `{kind, value}` / `{language, value}` object, or an array of those.
/// Language-tagged strings become fenced code blocks; array parts are joined
/// with a blank line.
pub fn hover_text(result: &Value) -> String {
    let contents = result.get("contents").unwrap_or(result);
    match contents {
        Value::Array(parts) => parts
            .iter()
            .map(marked_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        other => marked_text(other),
    }
}

fn marked_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let text = map.get("value").and_then(Value::as_str).unwrap_or_default();
            match map.get("language").and_then(Value::as_str) {
                Some(lang) => format!("```{lang}\n{text}\n```"),
                None => text.to_string(),
            }
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
