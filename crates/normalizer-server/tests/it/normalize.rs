use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::support::router;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// spec.md §8 scenario 1: an unknown CURIE normalizes to `null`, not an
/// error.
#[tokio::test]
async fn unknown_curie_normalizes_to_null() {
    let response = router().await
        .oneshot(
            Request::get("/get_normalized_nodes?curie=UNKNOWN:000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!({"UNKNOWN:000000": null}));
}

/// spec.md §8 scenario 2: an equivalent id resolves to its clique's
/// canonical identifier.
#[tokio::test]
async fn equivalent_id_resolves_to_canonical() {
    let response = router().await
        .oneshot(
            Request::get("/get_normalized_nodes?curie=DOID:0110474")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let record = &body["DOID:0110474"];
    assert_eq!(record["id"]["identifier"], "MONDO:0013985");
    let equivalent: Vec<&str> = record["equivalent_identifiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["identifier"].as_str().unwrap())
        .collect();
    assert!(equivalent.contains(&"DOID:0110474"));
}

/// spec.md §8 scenario 3: two CURIEs in the same clique both resolve and
/// share a preferred identifier.
#[tokio::test]
async fn shared_clique_members_share_preferred_identifier() {
    let response = router().await
        .oneshot(
            Request::get("/get_normalized_nodes?curie=MONDO:0005002&curie=DOID:3812")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let a = body["MONDO:0005002"]["id"]["identifier"].as_str().unwrap();
    let b = body["DOID:3812"]["id"]["identifier"].as_str().unwrap();
    assert_eq!(a, "MONDO:0005002");
    assert_eq!(a, b);
}

/// spec.md §8 scenario 4: an empty CURIE list is a 422 with the exact
/// pydantic-shaped detail body.
#[tokio::test]
async fn empty_curie_list_is_422_with_pydantic_detail() {
    let response = router().await
        .oneshot(
            Request::get("/get_normalized_nodes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(
        body["detail"][0]["msg"],
        "ensure this value has at least 1 items"
    );
    assert_eq!(body["detail"][0]["type"], "value_error.list.min_items");
}

#[tokio::test]
async fn empty_curies_body_is_422_with_pydantic_detail() {
    let response = router().await
        .oneshot(
            Request::post("/get_normalized_nodes")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({"curies": []}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(
        body["detail"][0]["msg"],
        "ensure this value has at least 1 items"
    );
    assert_eq!(body["detail"][0]["loc"], serde_json::json!(["body", "curies"]));
}

#[tokio::test]
async fn get_allowed_conflations_lists_both_flags() {
    let response = router().await
        .oneshot(
            Request::get("/get_allowed_conflations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["conflations"], serde_json::json!(["GeneProtein", "DrugChemical"]));
}
