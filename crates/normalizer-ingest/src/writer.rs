//! Streaming NDJSON ingestion into a [`MultiStore`], in pipelined blocks
//! (spec.md §4.H). Schema is validated against the first `schema_sample`
//! lines before any write is issued; a file that fails validation is
//! skipped entirely (spec.md §7).

use std::path::Path;

use normalizer_core::error::{NormalizerError, Result};
use normalizer_core::model::round_ic;
use normalizer_core::store::{MultiStore, StoreName};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::prefix_counts::PrefixCounts;
use crate::record::{CompendiumRecord, ConflationRecord};

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub records: usize,
    pub members: usize,
    pub malformed_lines: usize,
}

/// Reads the first `sample` non-empty lines of `path` and confirms each
/// parses as a [`CompendiumRecord`]. Any failure aborts the whole file.
async fn validate_compendium_schema(path: &Path, sample: usize) -> Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| NormalizerError::ValidationError(format!("{}: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();
    let mut checked = 0;
    while checked < sample {
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| NormalizerError::ValidationError(e.to_string()))?
        else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        serde_json::from_str::<CompendiumRecord>(&line).map_err(|e| {
            NormalizerError::ValidationError(format!(
                "{}: line {} failed schema validation: {e}",
                path.display(),
                checked + 1
            ))
        })?;
        checked += 1;
    }
    Ok(())
}

/// Ingests one compendium file, writing `eq->canon`, `canon->members`,
/// `canon->category`, and (when present) `canon->ic` in pipelined blocks of
/// `write_block_size`. Returns per-file stats and prefix counts; the
/// caller merges prefix counts across files before the final write.
pub async fn ingest_compendium_file(
    store: &dyn MultiStore,
    path: &Path,
    schema_sample: usize,
    write_block_size: usize,
) -> Result<(IngestStats, PrefixCounts)> {
    validate_compendium_schema(path, schema_sample).await?;

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| NormalizerError::ValidationError(format!("{}: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();

    let mut stats = IngestStats::default();
    let mut prefix_counts = PrefixCounts::new();

    let mut eq_batch: Vec<(String, String)> = Vec::new();
    let mut members_batch: Vec<(String, String)> = Vec::new();
    let mut category_batch: Vec<(String, String)> = Vec::new();
    let mut ic_batch: Vec<(String, String)> = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| NormalizerError::ValidationError(e.to_string()))?
    {
        if line.trim().is_empty() {
            continue;
        }
        let record: CompendiumRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping malformed compendium line");
                stats.malformed_lines += 1;
                continue;
            }
        };
        let Some(canonical) = record.canonical().map(str::to_string) else {
            warn!(file = %path.display(), "record has no identifiers, skipping");
            continue;
        };

        for member in &record.identifiers {
            eq_batch.push((member.identifier.to_uppercase(), canonical.clone()));
            prefix_counts.record(&record.category, &member.identifier);
        }
        members_batch.push((canonical.clone(), serde_json::to_string(&record.identifiers)?));
        category_batch.push((canonical.clone(), record.category.clone()));
        if let Some(ic) = record.ic {
            ic_batch.push((canonical.clone(), round_ic(ic).to_string()));
        }

        stats.records += 1;
        stats.members += record.identifiers.len();

        flush_if_full(store, StoreName::EqToCanonical, &mut eq_batch, write_block_size).await?;
        flush_if_full(store, StoreName::CanonToMembers, &mut members_batch, write_block_size).await?;
        flush_if_full(store, StoreName::CanonToCategory, &mut category_batch, write_block_size).await?;
        flush_if_full(store, StoreName::CanonToIc, &mut ic_batch, write_block_size).await?;
    }

    store.pipelined_set(StoreName::EqToCanonical, &eq_batch).await?;
    store.pipelined_set(StoreName::CanonToMembers, &members_batch).await?;
    store.pipelined_set(StoreName::CanonToCategory, &category_batch).await?;
    store.pipelined_set(StoreName::CanonToIc, &ic_batch).await?;

    Ok((stats, prefix_counts))
}

/// Ingests one conflation file: each line is an ordered list of canonical
/// CURIEs conflated together (preferred clique head first). Each member
/// writes to `store_name` the list of *other* members, preserving order.
pub async fn ingest_conflation_file(
    store: &dyn MultiStore,
    path: &Path,
    store_name: StoreName,
    write_block_size: usize,
) -> Result<usize> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| NormalizerError::ValidationError(format!("{}: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();

    let mut batch: Vec<(String, String)> = Vec::new();
    let mut records = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| NormalizerError::ValidationError(e.to_string()))?
    {
        if line.trim().is_empty() {
            continue;
        }
        let record: ConflationRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping malformed conflation line");
                continue;
            }
        };
        for (i, canonical) in record.canonicals.iter().enumerate() {
            let others: Vec<&String> = record
                .canonicals
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| c)
                .collect();
            batch.push((canonical.clone(), serde_json::to_string(&others)?));
        }
        records += 1;
        flush_if_full(store, store_name, &mut batch, write_block_size).await?;
    }
    store.pipelined_set(store_name, &batch).await?;
    Ok(records)
}

/// Writes and clears `category->prefix-counts` entries plus the
/// `semantic_types` list key, from the already-merged [`PrefixCounts`].
pub async fn write_prefix_counts(store: &dyn MultiStore, counts: &PrefixCounts) -> Result<()> {
    let entries = counts.to_json_per_category();
    store.pipelined_set(StoreName::CategoryToPrefixCounts, &entries).await?;
    let categories = serde_json::to_string(&counts.categories())?;
    store
        .pipelined_set(StoreName::CategoryToPrefixCounts, &[("semantic_types".to_string(), categories)])
        .await
}

async fn flush_if_full(
    store: &dyn MultiStore,
    store_name: StoreName,
    batch: &mut Vec<(String, String)>,
    block_size: usize,
) -> Result<()> {
    if batch.len() < block_size {
        return Ok(());
    }
    let block = std::mem::take(batch);
    store.pipelined_set(store_name, &block).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer_core::store::{MemoryMultiStore, MultiStore};

    async fn write_temp(lines: &[&str]) -> tempfile_path::TempPath {
        tempfile_path::write_lines(lines)
    }

    mod tempfile_path {
        use std::io::Write;
        pub struct TempPath(pub std::path::PathBuf);
        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        impl std::ops::Deref for TempPath {
            type Target = std::path::Path;
            fn deref(&self) -> &std::path::Path {
                &self.0
            }
        }
        pub fn write_lines(lines: &[&str]) -> TempPath {
            use std::sync::atomic::{AtomicU64, Ordering};
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir()
                .join(format!("normalizer-ingest-test-{}-{n}.ndjson", std::process::id()));
            let mut file = std::fs::File::create(&path).unwrap();
            for line in lines {
                writeln!(file, "{line}").unwrap();
            }
            TempPath(path)
        }
    }

    #[tokio::test]
    async fn ingests_compendium_and_counts_prefixes() {
        let path = write_temp(&[
            r#"{"type":"biolink:Disease","ic":87.6,"identifiers":[{"i":"MONDO:1","l":"disease one"},{"i":"DOID:1"}]}"#,
        ])
        .await;
        let store = MemoryMultiStore::new();
        let (stats, counts) = ingest_compendium_file(&store, &path, 1, 1000).await.unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.members, 2);

        let canon = store.get(StoreName::EqToCanonical, "MONDO:1").await.unwrap();
        assert_eq!(canon, Some("MONDO:1".to_string()));
        let members = store.get(StoreName::CanonToMembers, "MONDO:1").await.unwrap();
        assert!(members.unwrap().contains("DOID:1"));
        assert_eq!(counts.categories(), vec!["biolink:Disease".to_string()]);
    }

    #[tokio::test]
    async fn invalid_first_line_skips_whole_file() {
        let path = write_temp(&["{not json"]).await;
        let store = MemoryMultiStore::new();
        let result = ingest_compendium_file(&store, &path, 1, 1000).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn conflation_writes_others_excluding_self() {
        let path = write_temp(&[r#"["HGNC:1","UniProtKB:P1"]"#]).await;
        let store = MemoryMultiStore::new();
        ingest_conflation_file(&store, &path, StoreName::ConflationGeneProtein, 1000).await.unwrap();
        let others = store.get(StoreName::ConflationGeneProtein, "HGNC:1").await.unwrap().unwrap();
        assert_eq!(others, r#"["UniProtKB:P1"]"#);
    }
}
