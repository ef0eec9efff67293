//! `GET|POST /get_curie_prefixes` (spec.md §6).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Query;
use normalizer_core::store::StoreName;
use serde::{Deserialize, Serialize};

use crate::context::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize, Default)]
pub struct CuriePrefixesQuery {
    #[serde(default)]
    pub semantic_type: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CuriePrefixesBody {
    #[serde(default)]
    pub semantic_types: Vec<String>,
}

#[derive(Serialize)]
pub struct CuriePivot {
    pub curie_prefix: BTreeMap<String, u64>,
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CuriePrefixesQuery>,
) -> Result<Json<BTreeMap<String, CuriePivot>>, AppError> {
    fetch(&state, &query.semantic_type).await.map(Json)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CuriePrefixesBody>,
) -> Result<Json<BTreeMap<String, CuriePivot>>, AppError> {
    fetch(&state, &body.semantic_types).await.map(Json)
}

async fn fetch(state: &AppState, requested: &[String]) -> Result<BTreeMap<String, CuriePivot>, AppError> {
    let categories = if requested.is_empty() {
        state
            .store
            .lrange(StoreName::CategoryToPrefixCounts, "semantic_types", 0, -1)
            .await?
    } else {
        requested.to_vec()
    };

    let raw = state.store.multi_get(StoreName::CategoryToPrefixCounts, &categories).await?;
    let mut out = BTreeMap::new();
    for (category, value) in categories.into_iter().zip(raw.into_iter()) {
        let Some(json) = value else { continue };
        let Ok(counts) = serde_json::from_str::<BTreeMap<String, u64>>(&json) else {
            tracing::warn!(%category, "malformed category->prefix-counts value");
            continue;
        };
        out.insert(category, CuriePivot { curie_prefix: counts });
    }
    Ok(out)
}
