//! `GET|POST /get_setid` (spec.md §6).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Query;
use normalizer_core::SetIdResponse;
use serde::{Deserialize, Serialize};

use crate::context::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct GetSetIdQuery {
    #[serde(default)]
    pub curie: Vec<String>,
    #[serde(default)]
    pub conflation: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetIdQueryBody {
    pub curies: Vec<String>,
    #[serde(default)]
    pub conflations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetIdsBody {
    pub sets: BTreeMap<String, SetIdQueryBody>,
}

#[derive(Serialize)]
pub struct SetIdResponseWire {
    pub curies: Vec<String>,
    pub conflations: Vec<String>,
    pub normalized_curies: Vec<String>,
    pub normalized_ids: String,
    pub set_id: Option<String>,
}

impl From<SetIdResponse> for SetIdResponseWire {
    fn from(r: SetIdResponse) -> Self {
        SetIdResponseWire {
            curies: r.curies,
            conflations: r.conflations,
            normalized_curies: r.normalized_curies,
            normalized_ids: r.normalized_ids,
            set_id: r.set_id,
        }
    }
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetSetIdQuery>,
) -> Result<Json<SetIdResponseWire>, AppError> {
    let response = state.set_id_generator().generate(&query.curie, &query.conflation).await?;
    Ok(Json(response.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetIdsBody>,
) -> Result<Json<BTreeMap<String, SetIdResponseWire>>, AppError> {
    let mut out = BTreeMap::new();
    for (name, query) in body.sets {
        let response = state.set_id_generator().generate(&query.curies, &query.conflations).await?;
        out.insert(name, response.into());
    }
    Ok(Json(out))
}
