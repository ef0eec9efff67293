//! Per-category CURIE-prefix counting (spec.md §4.H), with a final merge
//! step that unions per-file counts before a single write per category.

use std::collections::BTreeMap;

/// Accumulates `category -> prefix -> count` across one or more files. The
/// caller builds one instance per file, then folds them together with
/// [`PrefixCounts::merge`] before writing.
#[derive(Debug, Clone, Default)]
pub struct PrefixCounts {
    per_category: BTreeMap<String, BTreeMap<String, u64>>,
}

impl PrefixCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: &str, identifier: &str) {
        let prefix = identifier.split_once(':').map(|(p, _)| p).unwrap_or(identifier);
        *self
            .per_category
            .entry(category.to_string())
            .or_default()
            .entry(prefix.to_string())
            .or_insert(0) += 1;
    }

    /// Unions `other` into `self`, summing counts for shared category/prefix
    /// pairs.
    pub fn merge(&mut self, other: PrefixCounts) {
        for (category, prefixes) in other.per_category {
            let entry = self.per_category.entry(category).or_default();
            for (prefix, count) in prefixes {
                *entry.entry(prefix).or_insert(0) += count;
            }
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.per_category.keys().cloned().collect()
    }

    /// Serializes each category's prefix-count mapping to JSON, ready for a
    /// single `category->prefix-counts` write per category.
    pub fn to_json_per_category(&self) -> Vec<(String, String)> {
        self.per_category
            .iter()
            .map(|(category, counts)| (category.clone(), serde_json::to_string(counts).unwrap()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_prefix_counts_per_category() {
        let mut counts = PrefixCounts::new();
        counts.record("biolink:Disease", "MONDO:1");
        counts.record("biolink:Disease", "MONDO:2");
        counts.record("biolink:Disease", "DOID:1");
        let json = counts.to_json_per_category();
        assert_eq!(json.len(), 1);
        assert_eq!(json[0].0, "biolink:Disease");
        let parsed: BTreeMap<String, u64> = serde_json::from_str(&json[0].1).unwrap();
        assert_eq!(parsed.get("MONDO"), Some(&2));
        assert_eq!(parsed.get("DOID"), Some(&1));
    }

    #[test]
    fn merge_sums_across_files() {
        let mut a = PrefixCounts::new();
        a.record("biolink:Disease", "MONDO:1");
        let mut b = PrefixCounts::new();
        b.record("biolink:Disease", "MONDO:2");
        b.record("biolink:Gene", "HGNC:1");
        a.merge(b);
        assert_eq!(a.categories().len(), 2);
        let json = a.to_json_per_category();
        let disease = json.iter().find(|(c, _)| c == "biolink:Disease").unwrap();
        let parsed: BTreeMap<String, u64> = serde_json::from_str(&disease.1).unwrap();
        assert_eq!(parsed.get("MONDO"), Some(&2));
    }
}
