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
async fn curie_prefixes_defaults_to_every_known_category() {
    let response = router().await
        .oneshot(Request::get("/get_curie_prefixes").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["biolink:Disease"]["curie_prefix"]["MONDO"], 3);
    assert_eq!(body["biolink:Disease"]["curie_prefix"]["DOID"], 2);
}

#[tokio::test]
async fn curie_prefixes_filters_to_requested_semantic_type() {
    let response = router().await
        .oneshot(
            Request::get("/get_curie_prefixes?semantic_type=biolink:Disease")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body.as_object().unwrap().len() == 1);
    assert!(body["biolink:Disease"].is_object());
}
