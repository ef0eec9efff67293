//! Label-priority policy (spec.md §4.C): picks a preferred label out of a
//! clique's member labels, prefix-boosted by category and filtered for
//! junk. Externalized as configuration per spec.md §9 ("Label policy
//! externalization") rather than hardcoded, the way the teacher loads its
//! own tunables through `control::config`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::model::{Category, CliqueMember};

/// `preferred_name_boost_prefixes` + `demote_labels_longer_than`, loaded
/// once at startup from a JSON document and otherwise immutable — the
/// policy function itself is pure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelPolicyConfig {
    /// category -> CURIE prefixes in priority order.
    #[serde(default)]
    pub preferred_name_boost_prefixes: HashMap<Category, Vec<String>>,
    /// Labels longer than this are demoted unless nothing shorter survives.
    #[serde(default = "default_demote_threshold")]
    pub demote_labels_longer_than: usize,
}

fn default_demote_threshold() -> usize {
    100
}

impl LabelPolicyConfig {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Returns ordered candidate label strings; the head is the preferred
/// label. An empty result means the clique has no preferred label.
pub fn candidate_labels(
    members: &[CliqueMember],
    categories: &[Category],
    config: &LabelPolicyConfig,
) -> Vec<String> {
    let ordered = reorder_by_boost(members, categories, config);
    let filtered = filter_suspicious(&ordered);
    demote_long(filtered, config.demote_labels_longer_than)
}

/// Convenience wrapper: the head of [`candidate_labels`], if any.
pub fn preferred_label(
    members: &[CliqueMember],
    categories: &[Category],
    config: &LabelPolicyConfig,
) -> Option<String> {
    candidate_labels(members, categories, config).into_iter().next()
}

/// Step 1-2: walk `categories` least-to-most specific, find the last
/// (most-specific) one present in the boost table, and reorder members so
/// boosted prefixes come first (stable otherwise). Falls back to member
/// order when no category matches.
fn reorder_by_boost(
    members: &[CliqueMember],
    categories: &[Category],
    config: &LabelPolicyConfig,
) -> Vec<String> {
    let boost = categories
        .iter()
        .rev()
        .find_map(|cat| config.preferred_name_boost_prefixes.get(cat));

    let labels_with_prefix: Vec<(&str, Option<&str>)> = members
        .iter()
        .filter_map(|m| m.label.as_deref().map(|l| (l, prefix_of(&m.identifier))))
        .collect();

    let Some(boost_prefixes) = boost else {
        return labels_with_prefix.into_iter().map(|(l, _)| l.to_string()).collect();
    };

    let rank = |prefix: Option<&str>| -> usize {
        prefix
            .and_then(|p| boost_prefixes.iter().position(|bp| bp == p))
            .unwrap_or(boost_prefixes.len())
    };

    let mut indexed: Vec<(usize, usize, &str)> = labels_with_prefix
        .iter()
        .enumerate()
        .map(|(i, (label, prefix))| (rank(*prefix), i, *label))
        .collect();
    indexed.sort_by_key(|(r, i, _)| (*r, *i));

    let mut seen = std::collections::HashSet::new();
    indexed
        .into_iter()
        .map(|(_, _, label)| label.to_string())
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

fn prefix_of(identifier: &str) -> Option<&str> {
    identifier.split_once(':').map(|(prefix, _)| prefix)
}

/// Step 3: drop empty/whitespace labels and labels starting with `CHEMBL`.
fn filter_suspicious(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .filter(|l| !l.trim().is_empty() && !l.starts_with("CHEMBL"))
        .cloned()
        .collect()
}

/// Step 4: if any surviving label is within the length limit, discard the
/// rest; otherwise keep everything.
fn demote_long(labels: Vec<String>, limit: usize) -> Vec<String> {
    if labels.iter().any(|l| l.len() <= limit) {
        labels.into_iter().filter(|l| l.len() <= limit).collect()
    } else {
        labels
    }
}
