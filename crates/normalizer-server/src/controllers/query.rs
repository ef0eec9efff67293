//! `POST /query` and `POST /asyncquery` (spec.md §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use normalizer_core::model::Message;
use normalizer_core::resolver::{ConflationFlags, NormalizeOptions};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::context::AppState;
use crate::error::AppError;

/// The wrapper both endpoints accept: a `message` field plus arbitrary
/// passthrough fields (`query_options`, workflow metadata, …) that TRAPI
/// callers attach and expect echoed back unchanged.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub message: Message,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub message: Message,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct AsyncQueryRequest {
    pub message: Message,
    pub callback: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct AsyncQueryAck {
    pub description: String,
}

fn default_options() -> NormalizeOptions {
    NormalizeOptions {
        conflation: ConflationFlags { gene_protein: true, chemical_drug: false },
        include_descriptions: false,
        include_individual_types: false,
    }
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let normalizer = state.message_normalizer();
    let message = normalizer.normalize(&request.message, default_options()).await?;
    Ok(Json(QueryResponse { message, extra: request.extra }))
}

pub async fn async_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AsyncQueryRequest>,
) -> Json<AsyncQueryAck> {
    let callback_url = request.callback.clone();
    tokio::spawn(async move {
        if let Err(err) = run_async_query(state, request).await {
            error!(%err, callback = %callback_url, "asyncquery background task failed");
        }
    });
    Json(AsyncQueryAck {
        description: "Query submitted for normalization; results will be POSTed to the callback URL.".to_string(),
    })
}

async fn run_async_query(state: Arc<AppState>, request: AsyncQueryRequest) -> anyhow::Result<()> {
    let normalizer = state.message_normalizer();
    let message = normalizer.normalize(&request.message, default_options()).await?;
    let response = QueryResponse { message, extra: request.extra };

    let result = state.callback_client.post(&request.callback).json(&response).send().await;
    match result {
        Ok(resp) if resp.status().is_success() => {
            info!(callback = %request.callback, status = %resp.status(), "asyncquery callback delivered");
        }
        Ok(resp) => {
            error!(callback = %request.callback, status = %resp.status(), "asyncquery callback rejected result");
        }
        Err(err) => {
            error!(callback = %request.callback, %err, "asyncquery callback unreachable after retries");
        }
    }
    Ok(())
}
