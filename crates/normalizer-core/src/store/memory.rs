//! An in-memory `MultiStore` used as the test double throughout this crate
//! and `normalizer-server`. Mirrors `tests/redis_mocks.py` /
//! `tests/helpers/redis_mocks.py` from the original implementation: fixture
//! data is inserted directly rather than loaded through ingestion.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{MultiStore, StoreName};
use crate::error::Result;

#[derive(Default)]
pub struct MemoryMultiStore {
    stores: RwLock<BTreeMap<StoreName, BTreeMap<String, String>>>,
    lists: RwLock<BTreeMap<StoreName, BTreeMap<String, Vec<String>>>>,
}

impl MemoryMultiStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/fixture helper: sets a scalar key in `store`.
    pub fn put(&self, store: StoreName, key: impl Into<String>, value: impl Into<String>) {
        self.stores
            .write()
            .unwrap()
            .entry(store)
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Test/fixture helper: sets a list-valued key in `store`.
    pub fn put_list(&self, store: StoreName, key: impl Into<String>, values: Vec<String>) {
        self.lists
            .write()
            .unwrap()
            .entry(store)
            .or_default()
            .insert(key.into(), values);
    }
}

#[async_trait]
impl MultiStore for MemoryMultiStore {
    async fn multi_get(&self, store: StoreName, keys: &[String]) -> Result<Vec<Option<String>>> {
        let stores = self.stores.read().unwrap();
        let table = stores.get(&store);
        Ok(keys
            .iter()
            .map(|k| table.and_then(|t| t.get(k)).cloned())
            .collect())
    }

    async fn lrange(&self, store: StoreName, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let lists = self.lists.read().unwrap();
        let Some(values) = lists.get(&store).and_then(|t| t.get(key)) else {
            return Ok(Vec::new());
        };
        let len = values.len() as isize;
        let norm = |i: isize| -> isize {
            if i < 0 {
                (len + i).max(0)
            } else {
                i.min(len)
            }
        };
        let (s, e) = (norm(start), if stop < 0 { norm(stop + 1) } else { (stop + 1).min(len) });
        if s >= e {
            return Ok(Vec::new());
        }
        Ok(values[s as usize..e as usize].to_vec())
    }

    async fn keys(&self, store: StoreName, pattern: &str) -> Result<Vec<String>> {
        let stores = self.stores.read().unwrap();
        let Some(table) = stores.get(&store) else {
            return Ok(Vec::new());
        };
        // Only `*` (match-all) is needed by ingestion tooling today.
        if pattern == "*" {
            Ok(table.keys().cloned().collect())
        } else {
            Ok(table.keys().filter(|k| k.as_str() == pattern).cloned().collect())
        }
    }

    async fn pipelined_set(&self, store: StoreName, entries: &[(String, String)]) -> Result<()> {
        let mut stores = self.stores.write().unwrap();
        let table = stores.entry(store).or_default();
        for (k, v) in entries {
            table.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn key_count(&self, store: StoreName) -> Result<u64> {
        let stores = self.stores.read().unwrap();
        Ok(stores.get(&store).map(|t| t.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multi_get_preserves_order_and_absence() {
        let store = MemoryMultiStore::new();
        store.put(StoreName::EqToCanonical, "A", "canon-a");
        let keys = vec!["A".to_string(), "MISSING".to_string()];
        let got = store.multi_get(StoreName::EqToCanonical, &keys).await.unwrap();
        assert_eq!(got, vec![Some("canon-a".to_string()), None]);
    }

    #[tokio::test]
    async fn lrange_full_list() {
        let store = MemoryMultiStore::new();
        store.put_list(
            StoreName::CategoryToPrefixCounts,
            "semantic_types",
            vec!["a".into(), "b".into(), "c".into()],
        );
        let got = store
            .lrange(StoreName::CategoryToPrefixCounts, "semantic_types", 0, -1)
            .await
            .unwrap();
        assert_eq!(got, vec!["a", "b", "c"]);
    }
}
