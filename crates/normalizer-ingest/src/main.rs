//! CLI entry point for loading compendium and conflation files into a
//! `MultiStore` backend. Out of the hard core by design (spec.md §4.H) —
//! this binary exists only to drive `normalizer_ingest`'s writer functions
//! against a real Redis-backed store.

use std::path::PathBuf;

use clap::Parser;
use normalizer_core::store::{RedisMultiStore, StoreBackendConfig, StoreName};
use normalizer_ingest::{ingest_compendium_file, ingest_conflation_file, write_prefix_counts, IngestStats, PrefixCounts};

#[derive(Parser, Debug)]
#[command(name = "normalizer-ingest", about = "Load compendium and conflation files into a MultiStore")]
struct Args {
    /// Path to the store-config YAML document (spec.md §6).
    #[arg(long, env = "STORE_CONFIG")]
    store_config: PathBuf,

    /// One or more newline-delimited JSON compendium files.
    #[arg(long = "compendium", num_args = 1..)]
    compendia: Vec<PathBuf>,

    /// Newline-delimited JSON gene/protein conflation file.
    #[arg(long)]
    conflation_gene_protein: Option<PathBuf>,

    /// Newline-delimited JSON drug/chemical conflation file.
    #[arg(long)]
    conflation_drug_chemical: Option<PathBuf>,

    /// Number of leading lines validated against the compendium schema
    /// before a file is trusted.
    #[arg(long, default_value_t = 10)]
    schema_sample: usize,

    /// Number of write operations accumulated per pipelined block.
    #[arg(long, default_value_t = 1000)]
    write_block_size: usize,

    /// Per-multi_get batch ceiling used while connecting to the store.
    #[arg(long, default_value_t = 2500)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config_bytes = tokio::fs::read(&args.store_config).await?;
    let store_config: StoreBackendConfig = serde_yaml::from_slice(&config_bytes)?;
    let store = RedisMultiStore::connect(&store_config, args.batch_size).await?;

    let mut prefix_counts = PrefixCounts::new();
    let mut total = IngestStats::default();

    for path in &args.compendia {
        match ingest_compendium_file(&store, path, args.schema_sample, args.write_block_size).await {
            Ok((stats, counts)) => {
                tracing::info!(file = %path.display(), records = stats.records, members = stats.members, "ingested compendium file");
                total.records += stats.records;
                total.members += stats.members;
                total.malformed_lines += stats.malformed_lines;
                prefix_counts.merge(counts);
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), %err, "skipping file that failed schema validation");
            }
        }
    }
    write_prefix_counts(&store, &prefix_counts).await?;

    if let Some(path) = &args.conflation_gene_protein {
        let n = ingest_conflation_file(&store, path, StoreName::ConflationGeneProtein, args.write_block_size).await?;
        tracing::info!(records = n, "ingested gene/protein conflation file");
    }
    if let Some(path) = &args.conflation_drug_chemical {
        let n = ingest_conflation_file(&store, path, StoreName::ConflationDrugChemical, args.write_block_size).await?;
        tracing::info!(records = n, "ingested drug/chemical conflation file");
    }

    tracing::info!(records = total.records, members = total.members, malformed_lines = total.malformed_lines, "ingestion complete");
    Ok(())
}
