//! `GET /status` (spec.md §6) and `GET /health` (SPEC_FULL.md §6 ambient
//! addition). Grounded on `control::controllers::health_check`'s
//! current-time + store-ping shape.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use normalizer_core::store::StoreName;
use serde::Serialize;

use crate::context::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub babel_version: String,
    pub current_time: DateTime<Utc>,
    pub store_key_counts: BTreeMap<&'static str, u64>,
}

pub async fn show(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut store_key_counts = BTreeMap::new();
    for store_name in StoreName::all() {
        let count = state.store.key_count(*store_name).await.unwrap_or(0);
        store_key_counts.insert(store_name.as_str(), count);
    }
    Json(StatusResponse {
        babel_version: state.settings.babel_version.clone(),
        current_time: Utc::now(),
        store_key_counts,
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub current_time: DateTime<Utc>,
    pub store_ping_ok: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ok = state.store.multi_get(StoreName::EqToCanonical, &[]).await.is_ok();
    Json(HealthResponse { current_time: Utc::now(), store_ping_ok: ok })
}
