//! Minimal OpenAPI document derived from the route table at startup
//! (SPEC_FULL.md §9): since hand-authoring the spec document is explicitly
//! out of scope (spec.md §1), the server instead reflects the same route
//! metadata used to build the [`crate::routes::app`] router, so the served
//! document can never drift from the actual surface.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::context::AppState;
use crate::routes::ROUTE_TABLE;

pub async fn show(State(state): State<Arc<AppState>>) -> Json<Value> {
    let server_url = state
        .settings
        .server_root
        .clone()
        .unwrap_or_else(|| format!("http://{}", state.settings.address()));

    let mut paths = serde_json::Map::new();
    for route in ROUTE_TABLE {
        let entry = paths.entry(route.path.to_string()).or_insert_with(|| json!({}));
        let methods = entry.as_object_mut().expect("path entry is an object");
        for method in route.methods {
            methods.insert(
                method.to_lowercase(),
                json!({ "summary": route.summary, "responses": { "200": { "description": "OK" } } }),
            );
        }
    }

    Json(json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Biomedical Identifier Normalization Service",
            "version": state.settings.babel_version,
        },
        "servers": [{ "url": server_url }],
        "paths": Value::Object(paths),
    }))
}
