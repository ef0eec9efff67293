//! Ingestion-writer interface for the normalization engine (spec.md §4.H).
//! Deliberately thin: it turns NDJSON compendium and conflation files into
//! writes against an abstract `MultiStore`, and nothing else. Ontology
//! fetching, label policy, and ancestor expansion all belong to
//! `normalizer-core` and are never invoked here.

pub mod prefix_counts;
pub mod record;
pub mod writer;

pub use prefix_counts::PrefixCounts;
pub use record::{CompendiumRecord, ConflationRecord};
pub use writer::{ingest_compendium_file, ingest_conflation_file, write_prefix_counts, IngestStats};
