use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::support::router;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_store_ping_ok() {
    let response = router().await.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["store_ping_ok"], true);
}

#[tokio::test]
async fn status_reports_babel_version_and_key_counts() {
    let response = router().await.oneshot(Request::get("/status").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["babel_version"], "test");
    assert!(body["store_key_counts"]["eq_to_canonical"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn get_semantic_types_is_deduplicated() {
    let response = router().await
        .oneshot(Request::get("/get_semantic_types").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let types = body["semantic_types"]["types"].as_array().unwrap();
    assert_eq!(types.len(), 2);
}

#[tokio::test]
async fn openapi_document_lists_routes_from_route_table() {
    let response = router().await.oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/get_normalized_nodes"].is_object());
    assert!(body["paths"]["/get_setid"].is_object());
}
