use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::router;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn query_normalizes_message_node_ids() {
    let body = json!({
        "message": {
            "query_graph": {
                "nodes": {"n0": {"ids": ["DOID:0110474"]}},
                "edges": {}
            },
            "knowledge_graph": {"nodes": {}, "edges": {}},
            "results": []
        },
        "submitter": "integration-test"
    });

    let response = router().await
        .oneshot(
            Request::post("/query")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["submitter"], "integration-test");
    let ids = body["message"]["query_graph"]["nodes"]["n0"]["ids"].as_array().unwrap();
    assert!(ids.iter().any(|v| v == "MONDO:0013985"));
}

#[tokio::test]
async fn asyncquery_acknowledges_and_delivers_callback() {
    let callback_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&callback_server)
        .await;

    let body = json!({
        "message": {
            "query_graph": {"nodes": {}, "edges": {}},
            "knowledge_graph": {"nodes": {}, "edges": {}},
            "results": []
        },
        "callback": format!("{}/callback", callback_server.uri()),
    });

    let response = router().await
        .oneshot(
            Request::post("/asyncquery")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = json_body(response).await;
    assert!(ack["description"].as_str().unwrap().contains("normalization"));

    let mut delivered = false;
    for _ in 0..20 {
        if !callback_server.received_requests().await.unwrap().is_empty() {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(delivered, "asyncquery callback was never delivered");
}
