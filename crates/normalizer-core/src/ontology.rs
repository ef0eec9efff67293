//! Category ancestor expansion (spec.md §4.B).
//!
//! The real ontology toolkit lives outside this crate's boundary; `Toolkit`
//! is the seam an embedder implements to wire one in. [`AncestorCache`]
//! memoizes the result per category, exactly as `FetchBuilds` memoizes
//! fetched build databases in the teacher.

use std::collections::HashMap;
use std::sync::RwLock;

/// The universal root category, removed from every `CliqueRecord::type`
/// (spec.md §4.4 rationale / invariant in §8).
pub const ENTITY_ROOT: &str = "biolink:Entity";

/// Substituted for a canonical whose leaf category is absent from
/// `canon->category` (spec.md §4.D step 2, Open Question in §9).
pub const NAMED_THING: &str = "biolink:NamedThing";

/// A source of ancestor chains for a category, most-specific first. An
/// implementation may return the seed category as its own first element;
/// [`AncestorCache`] deduplicates regardless.
pub trait Toolkit: Send + Sync {
    fn ancestors(&self, category: &str) -> Vec<String>;
}

/// Object-safe facade over [`AncestorCache`], used wherever the resolver and
/// server layers need to hold an ancestor source behind `Arc<dyn Ancestors>`
/// without naming the concrete toolkit type.
pub trait Ancestors: Send + Sync {
    fn ancestors(&self, category: &str) -> Vec<String>;
}

impl<T: Toolkit> Ancestors for AncestorCache<T> {
    fn ancestors(&self, category: &str) -> Vec<String> {
        AncestorCache::ancestors(self, category)
    }
}

/// A monotonic, write-once-per-key cache over a [`Toolkit`]. Concurrent
/// requests for the same uncached category may each compute the chain and
/// race to insert it; since the value is a pure function of the key this is
/// harmless (spec.md §5's "last-writer-wins race is acceptable").
pub struct AncestorCache<T: Toolkit> {
    toolkit: T,
    cache: RwLock<HashMap<String, Vec<String>>>,
}

impl<T: Toolkit> AncestorCache<T> {
    pub fn new(toolkit: T) -> Self {
        AncestorCache {
            toolkit,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns `[category, parent, ..., root]`, deduplicated, most-specific
    /// first.
    pub fn ancestors(&self, category: &str) -> Vec<String> {
        if let Some(hit) = self.cache.read().unwrap().get(category) {
            return hit.clone();
        }

        let mut chain = self.toolkit.ancestors(category);
        dedup_preserve_order(&mut chain);

        self.cache
            .write()
            .unwrap()
            .insert(category.to_string(), chain.clone());
        chain
    }
}

fn dedup_preserve_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}

/// Removes `biolink:Entity` if present, preserving order of the rest
/// (invariant in spec.md §8: "No universal root in type").
pub fn without_entity_root(categories: &[String]) -> Vec<String> {
    categories
        .iter()
        .filter(|c| c.as_str() != ENTITY_ROOT)
        .cloned()
        .collect()
}

/// A [`Toolkit`] backed by a fixed parent map, for tests and small
/// deployments that don't need a full ontology library.
pub struct StaticToolkit {
    parents: HashMap<String, String>,
}

impl StaticToolkit {
    pub fn new(parents: HashMap<String, String>) -> Self {
        StaticToolkit { parents }
    }
}

impl Toolkit for StaticToolkit {
    fn ancestors(&self, category: &str) -> Vec<String> {
        let mut chain = vec![category.to_string()];
        let mut current = category;
        while let Some(parent) = self.parents.get(current) {
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> StaticToolkit {
        let mut parents = HashMap::new();
        parents.insert("biolink:Disease".to_string(), "biolink:DiseaseOrPhenotypicFeature".to_string());
        parents.insert("biolink:DiseaseOrPhenotypicFeature".to_string(), "biolink:NamedThing".to_string());
        parents.insert("biolink:NamedThing".to_string(), ENTITY_ROOT.to_string());
        StaticToolkit::new(parents)
    }

    #[test]
    fn ancestors_most_specific_first() {
        let cache = AncestorCache::new(toolkit());
        let chain = cache.ancestors("biolink:Disease");
        assert_eq!(
            chain,
            vec![
                "biolink:Disease".to_string(),
                "biolink:DiseaseOrPhenotypicFeature".to_string(),
                "biolink:NamedThing".to_string(),
                ENTITY_ROOT.to_string(),
            ]
        );
    }

    #[test]
    fn ancestors_are_cached() {
        let cache = AncestorCache::new(toolkit());
        let first = cache.ancestors("biolink:Disease");
        let second = cache.ancestors("biolink:Disease");
        assert_eq!(first, second);
    }

    #[test]
    fn without_entity_root_strips_only_that_entry() {
        let cats = vec!["biolink:Disease".to_string(), ENTITY_ROOT.to_string()];
        assert_eq!(without_entity_root(&cats), vec!["biolink:Disease".to_string()]);
    }
}
