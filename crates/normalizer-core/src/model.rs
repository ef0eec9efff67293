//! Wire-level data model: clique members, cliques, normalization answers,
//! and the TRAPI-shaped message the [`crate::message`] module rewrites.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A category drawn from the biolink-style semantic type tree, e.g.
/// `biolink:Drug`. Opaque beyond string equality; ancestor expansion is the
/// job of [`crate::ontology`].
pub type Category = String;

/// One member of a clique, as persisted in `canon->members`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliqueMember {
    /// CURIE identifier. Always present.
    #[serde(rename = "i")]
    pub identifier: String,
    /// Preferred human label for this identifier, if any.
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered descriptions, possibly empty.
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<Vec<String>>,
    /// Per-member category, populated only when the caller asked for
    /// per-member types (set by the resolver, never persisted).
    #[serde(skip)]
    pub category: Option<Vec<Category>>,
}

impl CliqueMember {
    pub fn new(identifier: impl Into<String>) -> Self {
        CliqueMember {
            identifier: identifier.into(),
            label: None,
            descriptions: None,
            category: None,
        }
    }

    pub fn first_description(&self) -> Option<&str> {
        self.descriptions
            .as_ref()
            .and_then(|ds| ds.iter().find(|d| !d.is_empty()))
            .map(|s| s.as_str())
    }
}

/// An ordered, non-empty list of clique members. The first element is the
/// canonical representative.
pub type Clique = Vec<CliqueMember>;

/// A single identifier reference, used for the `preferred` field of a
/// [`CliqueRecord`] and as entries in `equivalent_identifiers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRef {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An entry in `equivalent_identifiers`, which additionally carries a
/// per-member category when the caller requested individual types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquivalentIdentifier {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// The normalization answer for a single input CURIE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliqueRecord {
    #[serde(rename = "id")]
    pub preferred: IdentifierRef,
    pub equivalent_identifiers: Vec<EquivalentIdentifier>,
    #[serde(rename = "type")]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_content: Option<f64>,
}

/// Rounds an information-content value to one decimal place, matching the
/// rounding spec.md §3 requires everywhere an IC value is surfaced.
pub fn round_ic(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// --- TRAPI message types -------------------------------------------------

/// A typed attribute value. TRAPI attributes carry heterogeneous values:
/// scalars, lists, or flat string-keyed maps. Deeply nested maps are
/// rejected by [`crate::message::attribute_hash`] rather than represented
/// further, per spec.md §4.F.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(serde_json::Value),
    List(Vec<serde_json::Value>),
    Map(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub attribute_type_id: String,
    pub value: AttributeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_attribute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QEdge {
    pub subject: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryGraph {
    #[serde(default)]
    pub nodes: IndexMap<String, QNode>,
    #[serde(default)]
    pub edges: IndexMap<String, QEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KEdge {
    pub subject: String,
    pub object: String,
    pub predicate: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: IndexMap<String, KNode>,
    #[serde(default)]
    pub edges: IndexMap<String, KEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeBinding {
    pub id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeBinding {
    pub id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub edge_bindings: IndexMap<String, Vec<EdgeBinding>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Result_ {
    #[serde(default)]
    pub node_bindings: IndexMap<String, Vec<NodeBinding>>,
    #[serde(default)]
    pub analyses: Vec<Analysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub query_graph: QueryGraph,
    #[serde(default)]
    pub knowledge_graph: KnowledgeGraph,
    #[serde(default)]
    pub results: Vec<Result_>,
}
