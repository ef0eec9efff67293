//! Newline-delimited JSON record shapes read from compendium and
//! conflation files (spec.md §4.H).

use normalizer_core::model::CliqueMember;
use serde::Deserialize;

/// One clique, as produced by the upstream build pipeline: an ordered
/// member list (first = canonical), a leaf category, and an optional
/// information-content score.
#[derive(Debug, Clone, Deserialize)]
pub struct CompendiumRecord {
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub ic: Option<f64>,
    pub identifiers: Vec<CliqueMember>,
}

impl CompendiumRecord {
    pub fn canonical(&self) -> Option<&str> {
        self.identifiers.first().map(|m| m.identifier.as_str())
    }
}

/// One conflation group: an ordered list of canonical CURIEs, most
/// preferred first (e.g. gene before protein). Ingestion expands this into
/// one "list of others" entry per member, per spec.md §4.E.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ConflationRecord {
    pub canonicals: Vec<String>,
}
