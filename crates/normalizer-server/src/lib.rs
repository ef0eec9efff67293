//! HTTP surface, configuration, and process bootstrap for the biomedical
//! identifier normalization service (spec.md §6, SPEC_FULL.md §4.I-J).
//!
//! This crate has no normalization logic of its own — it wires
//! `normalizer-core`'s pure engine to a concrete [`normalizer_core::store::RedisMultiStore`]
//! and exposes it over HTTP.

pub mod callback;
pub mod config;
pub mod context;
pub mod controllers;
pub mod cors;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod startup;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use normalizer_core::ontology::{AncestorCache, Ancestors, StaticToolkit};
use normalizer_core::store::RedisMultiStore;
use normalizer_core::Resolver;

use context::AppState;

#[derive(Parser, Debug)]
#[command(name = "normalizer-server", about = "Biomedical identifier normalization service")]
pub struct Args {
    /// Directory containing `base.{yaml,toml,json}` and `<APP_ENV>.*` overlay
    /// settings files.
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Path to the store-config YAML document (spec.md §6).
    #[arg(long, env = "STORE_CONFIG")]
    pub store_config: PathBuf,

    /// Path to the JSON label-priority policy document (spec.md §3, §9).
    #[arg(long, env = "LABEL_POLICY")]
    pub label_policy: Option<PathBuf>,

    /// Path to a JSON document mapping category -> parent category, used by
    /// the built-in [`StaticToolkit`] ancestor source in the absence of a
    /// full ontology library.
    #[arg(long, env = "CATEGORY_PARENTS")]
    pub category_parents: Option<PathBuf>,
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let settings = config::load_settings(&args.config_dir)?;
    let store_config = config::load_store_config(&args.store_config)?;

    let label_policy = match &args.label_policy {
        Some(path) => config::load_label_policy(path)?,
        None => config::default_label_policy(),
    };

    let parents = match &args.category_parents {
        Some(path) => serde_json::from_slice(&std::fs::read(path)?)?,
        None => std::collections::HashMap::new(),
    };
    let ancestors: Arc<dyn Ancestors> = Arc::new(AncestorCache::new(StaticToolkit::new(parents)));

    let store: Arc<dyn normalizer_core::store::MultiStore> =
        Arc::new(RedisMultiStore::connect(&store_config, settings.application.eq_batch_size).await?);

    let resolver = Resolver::new(store.clone(), ancestors, Arc::new(label_policy));

    let state = Arc::new(AppState {
        resolver,
        settings: settings.application,
        store,
        callback_client: callback::callback_client(),
    });

    let listener = tokio::net::TcpListener::bind(state.settings.address()).await?;
    tracing::info!(address = %state.settings.address(), "normalizer-server listening");

    startup::serve(listener, state).await
}
