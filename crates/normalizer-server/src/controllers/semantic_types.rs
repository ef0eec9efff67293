//! `GET /get_semantic_types` (spec.md §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use normalizer_core::store::StoreName;
use serde::Serialize;

use crate::context::AppState;
use crate::error::AppError;

#[derive(Serialize)]
pub struct SemanticTypesResponse {
    pub semantic_types: SemanticTypesBody,
}

#[derive(Serialize)]
pub struct SemanticTypesBody {
    pub types: Vec<String>,
}

pub async fn show(State(state): State<Arc<AppState>>) -> Result<Json<SemanticTypesResponse>, AppError> {
    let mut types = state
        .store
        .lrange(StoreName::CategoryToPrefixCounts, "semantic_types", 0, -1)
        .await?;
    dedup_preserve_order(&mut types);
    Ok(Json(SemanticTypesResponse { semantic_types: SemanticTypesBody { types } }))
}

fn dedup_preserve_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}
