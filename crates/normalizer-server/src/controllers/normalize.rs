//! `GET|POST /get_normalized_nodes` (spec.md §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Query;
use normalizer_core::resolver::{ConflationFlags, NormalizeOptions};
use serde::{Deserialize, Serialize};

use crate::context::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct GetNormalizedNodesQuery {
    #[serde(default)]
    pub curie: Vec<String>,
    #[serde(default = "default_true")]
    pub conflate: bool,
    #[serde(default)]
    pub drug_chemical_conflate: bool,
    #[serde(default)]
    pub description: bool,
    #[serde(default)]
    pub individual_types: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct NormalizedNodesBody {
    pub curies: Vec<String>,
    #[serde(default = "default_true")]
    pub conflate: bool,
    #[serde(default)]
    pub drug_chemical_conflate: bool,
    #[serde(default)]
    pub description: bool,
    #[serde(default)]
    pub individual_types: bool,
}

pub type NormalizedNodesResponse = serde_json::Map<String, serde_json::Value>;

pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetNormalizedNodesQuery>,
) -> Result<Json<NormalizedNodesResponse>, AppError> {
    if query.curie.is_empty() {
        return Err(AppError::EmptyCurieList { loc: vec!["query", "curie"] });
    }
    let options = options_from(query.conflate, query.drug_chemical_conflate, query.description, query.individual_types);
    respond(&state, &query.curie, options).await
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NormalizedNodesBody>,
) -> Result<Json<NormalizedNodesResponse>, AppError> {
    if body.curies.is_empty() {
        return Err(AppError::EmptyCurieList { loc: vec!["body", "curies"] });
    }
    let options = options_from(body.conflate, body.drug_chemical_conflate, body.description, body.individual_types);
    respond(&state, &body.curies, options).await
}

fn options_from(conflate: bool, drug_chemical_conflate: bool, description: bool, individual_types: bool) -> NormalizeOptions {
    NormalizeOptions {
        conflation: ConflationFlags { gene_protein: conflate, chemical_drug: drug_chemical_conflate },
        include_descriptions: description,
        include_individual_types: individual_types,
    }
}

async fn respond(
    state: &AppState,
    curies: &[String],
    options: NormalizeOptions,
) -> Result<Json<NormalizedNodesResponse>, AppError> {
    let results = state.resolver.normalize(curies, options).await?;
    let mut out = serde_json::Map::with_capacity(results.len());
    for (curie, record) in results {
        let value = match record {
            Some(record) => serde_json::to_value(record).map_err(normalizer_core::NormalizerError::from)?,
            None => serde_json::Value::Null,
        };
        out.insert(curie, value);
    }
    Ok(Json(out))
}

/// `GET /get_allowed_conflations` (spec.md §6).
#[derive(Serialize)]
pub struct AllowedConflations {
    pub conflations: Vec<&'static str>,
}

pub async fn allowed_conflations() -> Json<AllowedConflations> {
    Json(AllowedConflations { conflations: normalizer_core::ALLOWED_CONFLATIONS.to_vec() })
}
