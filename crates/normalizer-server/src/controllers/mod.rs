//! HTTP handlers, one module per endpoint family (spec.md §6). Grounded on
//! `control::controllers::{connectors, health_check}`'s split between a
//! thin handler module and the route table in [`crate::routes`].

pub mod curie_prefixes;
pub mod normalize;
pub mod query;
pub mod semantic_types;
pub mod setid;
pub mod status;
