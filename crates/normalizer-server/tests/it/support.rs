use std::collections::HashMap;
use std::sync::Arc;

use normalizer_core::ontology::{AncestorCache, Ancestors, StaticToolkit};
use normalizer_core::label_policy::LabelPolicyConfig;
use normalizer_core::store::{MemoryMultiStore, MultiStore, StoreName};
use normalizer_core::Resolver;
use normalizer_server::config::{ApplicationSettings, CorsSettings};
use normalizer_server::context::AppState;

/// Builds the fixture store used throughout spec.md §8's concrete
/// scenarios: a `MONDO:0005002`/`DOID:3812` disease clique, a
/// `PUBCHEM.COMPOUND`/`CHEBI`/`UNII` chemical clique conflated by
/// drug/chemical, and a gene/protein conflation pair, matching the worked
/// examples in spec.md §8 items 5-6.
pub fn fixture_store() -> MemoryMultiStore {
    let store = MemoryMultiStore::new();

    // DOID:0110474 <-> MONDO:0013985 (spec.md §8 item 2).
    store.put(StoreName::EqToCanonical, "DOID:0110474", "MONDO:0013985");
    store.put(StoreName::EqToCanonical, "MONDO:0013985", "MONDO:0013985");
    store.put(
        StoreName::CanonToMembers,
        "MONDO:0013985",
        r#"[{"i":"MONDO:0013985","l":"disease x"},{"i":"DOID:0110474","l":"doid label"}]"#,
    );
    store.put(StoreName::CanonToCategory, "MONDO:0013985", "biolink:Disease");

    // MONDO:0005002 / DOID:3812, same clique (spec.md §8 item 3).
    store.put(StoreName::EqToCanonical, "MONDO:0005002", "MONDO:0005002");
    store.put(StoreName::EqToCanonical, "DOID:3812", "MONDO:0005002");
    store.put(
        StoreName::CanonToMembers,
        "MONDO:0005002",
        r#"[{"i":"MONDO:0005002","l":"asthma"},{"i":"DOID:3812","l":"asthma (DOID)"}]"#,
    );
    store.put(StoreName::CanonToCategory, "MONDO:0005002", "biolink:Disease");

    // MONDO:0005003, a distinct disease clique.
    store.put(StoreName::EqToCanonical, "MONDO:0005003", "MONDO:0005003");
    store.put(
        StoreName::CanonToMembers,
        "MONDO:0005003",
        r#"[{"i":"MONDO:0005003","l":"bronchitis"}]"#,
    );
    store.put(StoreName::CanonToCategory, "MONDO:0005003", "biolink:Disease");

    // UNII:63M8RYN44N <-> PUBCHEM.COMPOUND:10129877, drug/chemical-conflated
    // with CHEBI:15377 (spec.md §8 items 5-6).
    store.put(StoreName::EqToCanonical, "UNII:63M8RYN44N", "PUBCHEM.COMPOUND:10129877");
    store.put(StoreName::EqToCanonical, "PUBCHEM.COMPOUND:10129877", "PUBCHEM.COMPOUND:10129877");
    store.put(
        StoreName::CanonToMembers,
        "PUBCHEM.COMPOUND:10129877",
        r#"[{"i":"PUBCHEM.COMPOUND:10129877","l":"a chemical"},{"i":"UNII:63M8RYN44N"}]"#,
    );
    store.put(StoreName::CanonToCategory, "PUBCHEM.COMPOUND:10129877", "biolink:SmallMolecule");
    store.put(
        StoreName::ConflationDrugChemical,
        "PUBCHEM.COMPOUND:10129877",
        r#"["CHEBI:15377"]"#,
    );
    store.put(StoreName::EqToCanonical, "CHEBI:15377", "CHEBI:15377");
    store.put(
        StoreName::CanonToMembers,
        "CHEBI:15377",
        r#"[{"i":"CHEBI:15377","l":"water"}]"#,
    );
    store.put(StoreName::CanonToCategory, "CHEBI:15377", "biolink:SmallMolecule");

    store.put_list(
        StoreName::CategoryToPrefixCounts,
        "semantic_types",
        vec!["biolink:Disease".to_string(), "biolink:SmallMolecule".to_string()],
    );
    store.put(
        StoreName::CategoryToPrefixCounts,
        "biolink:Disease",
        r#"{"MONDO":3,"DOID":2}"#,
    );

    store
}

pub fn ancestors() -> Arc<dyn Ancestors> {
    let mut parents = HashMap::new();
    parents.insert("biolink:Disease".to_string(), "biolink:NamedThing".to_string());
    parents.insert("biolink:SmallMolecule".to_string(), "biolink:NamedThing".to_string());
    parents.insert("biolink:NamedThing".to_string(), normalizer_core::ontology::ENTITY_ROOT.to_string());
    Arc::new(AncestorCache::new(StaticToolkit::new(parents)))
}

pub async fn test_state() -> Arc<AppState> {
    let store: Arc<dyn MultiStore> = Arc::new(fixture_store());
    let resolver = Resolver::new(store.clone(), ancestors(), Arc::new(LabelPolicyConfig::default()));
    Arc::new(AppState {
        resolver,
        settings: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsSettings::default(),
            eq_batch_size: 2500,
            babel_version: "test".to_string(),
            server_root: None,
        },
        store,
        callback_client: normalizer_server::callback::callback_client(),
    })
}

pub async fn router() -> axum::Router {
    normalizer_server::routes::app(test_state().await)
}
