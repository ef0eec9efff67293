//! The `MultiStore` abstraction over the seven logical stores that together
//! encode the clique graph (spec.md §4.A).

mod memory;
mod redis_backend;

pub use memory::MemoryMultiStore;
pub use redis_backend::{RedisMultiStore, StoreBackendConfig, StoreDescriptor};

use async_trait::async_trait;

use crate::error::{NormalizerError, Result};

/// The default ceiling on the number of keys in a single `multi_get`
/// request before it must be split into sequential chunks. Overridable via
/// `EQ_BATCH_SIZE` at the server layer; passed down to the store here.
pub const DEFAULT_BATCH_SIZE: usize = 2500;

/// The default number of write operations accumulated per pipelined
/// ingestion block.
pub const DEFAULT_WRITE_BLOCK_SIZE: usize = 1000;

/// The seven logical stores of spec.md §4.A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreName {
    /// uppercased CURIE -> canonical CURIE
    EqToCanonical,
    /// canonical CURIE -> JSON list of `CliqueMember`
    CanonToMembers,
    /// canonical CURIE -> category string
    CanonToCategory,
    /// canonical CURIE -> decimal string (information content)
    CanonToIc,
    /// category, plus the `semantic_types` list key -> JSON prefix counts
    CategoryToPrefixCounts,
    /// canonical CURIE -> JSON list of other canonical CURIEs (gene/protein)
    ConflationGeneProtein,
    /// canonical CURIE -> JSON list of other canonical CURIEs (drug/chemical)
    ConflationDrugChemical,
}

impl StoreName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreName::EqToCanonical => "eq_to_canonical",
            StoreName::CanonToMembers => "canon_to_members",
            StoreName::CanonToCategory => "canon_to_category",
            StoreName::CanonToIc => "canon_to_ic",
            StoreName::CategoryToPrefixCounts => "category_to_prefix_counts",
            StoreName::ConflationGeneProtein => "conflation_gene_protein",
            StoreName::ConflationDrugChemical => "conflation_drug_chemical",
        }
    }

    pub fn all() -> &'static [StoreName] {
        &[
            StoreName::EqToCanonical,
            StoreName::CanonToMembers,
            StoreName::CanonToCategory,
            StoreName::CanonToIc,
            StoreName::CategoryToPrefixCounts,
            StoreName::ConflationGeneProtein,
            StoreName::ConflationDrugChemical,
        ]
    }

    pub fn from_str(s: &str) -> Option<StoreName> {
        Self::all().iter().copied().find(|n| n.as_str() == s)
    }
}

/// Abstract, batched access to the seven logical stores.
///
/// Implementations must honor the batching contract of spec.md §4.A:
/// `multi_get` is positionally aligned with its input keys (missing keys
/// yield `None`), and any request whose key count exceeds the
/// implementation's ceiling is split into fixed-size chunks issued
/// sequentially, with results concatenated in order. A batch either fully
/// succeeds or fails with `NormalizerError::StoreUnavailable` — there is no
/// partial-result mode.
#[async_trait]
pub trait MultiStore: Send + Sync {
    /// Batched get. `values[i]` corresponds to `keys[i]`; `None` marks an
    /// absent key.
    async fn multi_get(&self, store: StoreName, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Single-key get, used by ingestion and the semantic-types listing.
    async fn get(&self, store: StoreName, key: &str) -> Result<Option<String>> {
        Ok(self.multi_get(store, std::slice::from_ref(&key.to_string())).await?.into_iter().next().flatten())
    }

    /// `LRANGE`-equivalent over a list-valued key (used for the
    /// `semantic_types` list in `category_to_prefix_counts`).
    async fn lrange(&self, store: StoreName, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Pattern-matched key listing, used by ingestion tooling.
    async fn keys(&self, store: StoreName, pattern: &str) -> Result<Vec<String>>;

    /// Writes `key -> value` pairs to `store` in pipelined blocks of
    /// `DEFAULT_WRITE_BLOCK_SIZE` (or fewer for the final block).
    async fn pipelined_set(&self, store: StoreName, entries: &[(String, String)]) -> Result<()>;

    /// The number of keys in `store`, used by the `/status` endpoint.
    async fn key_count(&self, store: StoreName) -> Result<u64>;
}

/// Splits `keys` into chunks no larger than `batch_size`, in order. A
/// `batch_size` of zero is treated as "no limit" (a single chunk).
pub fn chunk_keys<'a>(keys: &'a [String], batch_size: usize) -> Vec<&'a [String]> {
    if batch_size == 0 || keys.len() <= batch_size {
        return vec![keys];
    }
    keys.chunks(batch_size).collect()
}

/// Helper for implementations: runs `multi_get`-shaped work over chunks and
/// concatenates results positionally. `f` performs one chunk's worth of
/// work.
pub async fn batched<'a, F, Fut>(
    keys: &'a [String],
    batch_size: usize,
    mut f: F,
) -> Result<Vec<Option<String>>>
where
    F: FnMut(&'a [String]) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<Option<String>>>>,
{
    let mut out = Vec::with_capacity(keys.len());
    for chunk in chunk_keys(keys, batch_size) {
        let mut part = f(chunk).await?;
        out.append(&mut part);
    }
    Ok(out)
}

pub(crate) fn unavailable(err: impl std::fmt::Display) -> NormalizerError {
    NormalizerError::StoreUnavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_keys_splits_in_order() {
        let keys: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let chunks = chunk_keys(&keys, 3);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], &keys[0..3]);
        assert_eq!(chunks[3], &keys[9..10]);
    }

    #[test]
    fn chunk_keys_single_chunk_when_under_limit() {
        let keys: Vec<String> = (0..3).map(|i| i.to_string()).collect();
        let chunks = chunk_keys(&keys, 100);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn store_name_round_trips_through_str() {
        for name in StoreName::all() {
            assert_eq!(StoreName::from_str(name.as_str()), Some(*name));
        }
        assert_eq!(StoreName::from_str("nonsense"), None);
    }
}
