use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::support::router;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const SCENARIO_CURIES: &str =
    "curie=DOID:3812&curie=MONDO:0005002&curie=MONDO:0005003&curie=UNII:63M8RYN44N&curie=";

/// spec.md §8 scenario 5: GeneProtein conflation alone leaves the
/// UNII/PUBCHEM.COMPOUND clique addressed by its ordinary equivalence, not
/// the conflation overlay.
#[tokio::test]
async fn setid_scenario_five_gene_protein_only() {
    let response = router().await
        .oneshot(
            Request::get(format!("/get_setid?{SCENARIO_CURIES}&conflation=GeneProtein"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["normalized_curies"],
        serde_json::json!(["", "MONDO:0005002", "MONDO:0005003", "PUBCHEM.COMPOUND:10129877"])
    );
    assert_eq!(body["set_id"], "uuid:08da0da0-4b47-55e6-b9b2-73ead9921494");
}

/// spec.md §8 scenario 6: adding DrugChemical conflation replaces the
/// chemical clique's members with its conflated overlay, substituting
/// `CHEBI:15377` for `PUBCHEM.COMPOUND:10129877` in the normalized set.
#[tokio::test]
async fn setid_scenario_six_gene_protein_and_drug_chemical() {
    let response = router().await
        .oneshot(
            Request::get(format!(
                "/get_setid?{SCENARIO_CURIES}&conflation=GeneProtein&conflation=DrugChemical"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["normalized_curies"],
        serde_json::json!(["", "CHEBI:15377", "MONDO:0005002", "MONDO:0005003"])
    );
    assert_eq!(body["set_id"], "uuid:4b54135a-a151-561b-8b25-8a5a5b710700");
}

#[tokio::test]
async fn post_get_setid_resolves_named_sets() {
    let body = serde_json::json!({
        "sets": {
            "asthma": {"curies": ["MONDO:0005002", "DOID:3812"], "conflations": []},
        }
    });
    let response = router().await
        .oneshot(
            Request::post("/get_setid")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["asthma"]["normalized_curies"], serde_json::json!(["MONDO:0005002"]));
    assert!(body["asthma"]["set_id"].is_string());
}
