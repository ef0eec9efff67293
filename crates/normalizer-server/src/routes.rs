//! Route table (spec.md §6), grounded on `control::routes`'s
//! handler/route-table split. [`ROUTE_TABLE`] doubles as the source for
//! [`crate::openapi`]'s generated document, so the two can never drift.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::context::AppState;
use crate::controllers::{curie_prefixes, normalize, query, semantic_types, setid, status};

pub struct RouteMeta {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub summary: &'static str,
}

pub const ROUTE_TABLE: &[RouteMeta] = &[
    RouteMeta { path: "/get_normalized_nodes", methods: &["GET", "POST"], summary: "Normalize CURIEs into cliques" },
    RouteMeta { path: "/query", methods: &["POST"], summary: "Normalize a TRAPI message" },
    RouteMeta { path: "/asyncquery", methods: &["POST"], summary: "Normalize a TRAPI message asynchronously" },
    RouteMeta { path: "/get_setid", methods: &["GET", "POST"], summary: "Compute a stable set identifier for a CURIE set" },
    RouteMeta { path: "/get_semantic_types", methods: &["GET"], summary: "List discovered semantic types" },
    RouteMeta { path: "/get_curie_prefixes", methods: &["GET", "POST"], summary: "Per-category CURIE prefix counts" },
    RouteMeta { path: "/get_allowed_conflations", methods: &["GET"], summary: "List allowed conflation flag names" },
    RouteMeta { path: "/status", methods: &["GET"], summary: "Service metadata and per-store key counts" },
    RouteMeta { path: "/health", methods: &["GET"], summary: "Liveness probe" },
];

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_normalized_nodes", get(normalize::show).post(normalize::create))
        .route("/query", post(query::query))
        .route("/asyncquery", post(query::async_query))
        .route("/get_setid", get(setid::show).post(setid::create))
        .route("/get_semantic_types", get(semantic_types::show))
        .route("/get_curie_prefixes", get(curie_prefixes::show).post(curie_prefixes::create))
        .route("/get_allowed_conflations", get(normalize::allowed_conflations))
        .route("/status", get(status::show))
        .route("/health", get(status::health))
        .route("/openapi.json", get(crate::openapi::show))
        .with_state(state)
}
