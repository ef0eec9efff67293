//! TRAPI Message Normalizer (spec.md §4.F): query-graph, knowledge-graph,
//! and results passes that rewrite a [`Message`] in place of node/edge
//! identity with clique-normalized identity, merging and deduplicating
//! along the way. Grounded on the original implementation's
//! `normalize_kgraph` shape, reworked as three explicit passes over owned
//! data with no references back into the source message.

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Attribute, AttributeValue, KEdge, KNode, KnowledgeGraph, Message, QueryGraph, Result_};
use crate::resolver::{NormalizeOptions, Resolver};

/// `biolink:has_numeric_value` attribute type id used for the
/// information-content attribute appended during merge (spec.md §4.F).
const IC_ATTRIBUTE_TYPE: &str = "biolink:has_numeric_value";
const IC_VALUE_TYPE: &str = "EDAM:data_0006";
const SAME_AS_ATTRIBUTE_TYPE: &str = "biolink:same_as";

pub struct MessageNormalizer<'a> {
    resolver: &'a Resolver,
}

impl<'a> MessageNormalizer<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        MessageNormalizer { resolver }
    }

    pub async fn normalize(&self, message: &Message, options: NormalizeOptions) -> Result<Message> {
        let query_graph = self.normalize_query_graph(&message.query_graph, options).await?;

        let mut node_id_map = HashMap::new();
        let knowledge_graph = self
            .normalize_knowledge_graph(&message.knowledge_graph, options, &mut node_id_map)
            .await?;
        let edge_id_map = build_edge_id_map(&message.knowledge_graph, &knowledge_graph, &node_id_map);

        let results = self.normalize_results(&message.results, &node_id_map, &edge_id_map, options).await?;

        Ok(Message { query_graph, knowledge_graph, results })
    }

    async fn normalize_query_graph(&self, graph: &QueryGraph, options: NormalizeOptions) -> Result<QueryGraph> {
        let mut nodes = IndexMap::new();
        for (key, qnode) in &graph.nodes {
            let mut new_node = qnode.clone();
            if let Some(ids) = &qnode.ids {
                if !ids.is_empty() {
                    let resolved = self.resolver.normalize(ids, options).await?;
                    let mut seen = HashSet::new();
                    let mut new_ids = Vec::new();
                    for (original, record) in resolved {
                        let id = record
                            .map(|r| r.preferred.identifier)
                            .unwrap_or(original);
                        if seen.insert(id.clone()) {
                            new_ids.push(id);
                        }
                    }
                    new_node.ids = Some(new_ids);
                }
            }
            nodes.insert(key.clone(), new_node);
        }
        Ok(QueryGraph { nodes, edges: graph.edges.clone() })
    }

    async fn normalize_knowledge_graph(
        &self,
        graph: &KnowledgeGraph,
        options: NormalizeOptions,
        node_id_map: &mut HashMap<String, String>,
    ) -> Result<KnowledgeGraph> {
        let ids: Vec<String> = graph.nodes.keys().cloned().collect();
        let resolved = self.resolver.normalize(&ids, options).await?;
        let record_by_id: HashMap<String, Option<crate::model::CliqueRecord>> =
            resolved.into_iter().collect();

        let mut emitted: IndexMap<String, KNode> = IndexMap::new();
        let mut merge_counts: HashMap<String, usize> = HashMap::new();

        for (id, node) in &graph.nodes {
            match record_by_id.get(id).and_then(|r| r.clone()) {
                None => {
                    node_id_map.insert(id.clone(), id.clone());
                    emitted.entry(id.clone()).or_insert_with(|| node.clone());
                }
                Some(record) => {
                    let preferred = record.preferred.identifier.clone();
                    node_id_map.insert(id.clone(), preferred.clone());

                    if let Some(primary) = emitted.get_mut(&preferred) {
                        merge_into(primary, node, merge_counts.entry(preferred.clone()).or_insert(1));
                    } else {
                        let mut primary = KNode {
                            name: record
                                .preferred
                                .label
                                .clone()
                                .or_else(|| node.name.clone())
                                .or(Some(String::new())),
                            categories: record.categories.clone(),
                            attributes: node.attributes.clone(),
                        };
                        let same_as_values: Vec<Value> = record
                            .equivalent_identifiers
                            .iter()
                            .map(|e| Value::String(e.identifier.clone()))
                            .collect();
                        primary.attributes.push(Attribute {
                            attribute_type_id: SAME_AS_ATTRIBUTE_TYPE.to_string(),
                            value: AttributeValue::List(same_as_values),
                            value_type_id: None,
                            original_attribute_name: None,
                            value_url: None,
                            attribute_source: None,
                        });
                        if let Some(ic) = record.information_content {
                            primary.attributes.push(ic_attribute(ic));
                        }
                        merge_counts.insert(preferred.clone(), 1);
                        emitted.insert(preferred, primary);
                    }
                }
            }
        }

        let mut edges = IndexMap::new();
        let mut signatures: HashMap<(String, String, String, String), String> = HashMap::new();
        for (key, edge) in &graph.edges {
            let subject = node_id_map.get(&edge.subject).cloned().unwrap_or_else(|| edge.subject.clone());
            let object = node_id_map.get(&edge.object).cloned().unwrap_or_else(|| edge.object.clone());
            let hash = attribute_hash_or_fresh(&edge.attributes);
            let signature = (subject.clone(), edge.predicate.clone(), object.clone(), hash);

            if signatures.contains_key(&signature) {
                continue;
            }
            signatures.insert(signature, key.clone());
            edges.insert(
                key.clone(),
                KEdge { subject, object, predicate: edge.predicate.clone(), attributes: edge.attributes.clone(), sources: edge.sources.clone() },
            );
        }

        Ok(KnowledgeGraph { nodes: emitted, edges })
    }

    async fn normalize_results(
        &self,
        results: &[Result_],
        node_id_map: &HashMap<String, String>,
        edge_id_map: &HashMap<String, String>,
        _options: NormalizeOptions,
    ) -> Result<Vec<Result_>> {
        let mut canonical_seen = HashSet::new();
        let mut out = Vec::new();

        for result in results {
            let mut node_bindings = IndexMap::new();
            for (qnode_key, bindings) in &result.node_bindings {
                let mut binding_seen = HashSet::new();
                let mut new_bindings = Vec::new();
                for binding in bindings {
                    let mut new_binding = binding.clone();
                    new_binding.id = node_id_map.get(&binding.id).cloned().unwrap_or_else(|| binding.id.clone());
                    let signature = binding_signature(&new_binding.id, &new_binding.extra);
                    if binding_seen.insert(signature) {
                        new_bindings.push(new_binding);
                    }
                }
                node_bindings.insert(qnode_key.clone(), new_bindings);
            }

            let mut analyses = Vec::new();
            for analysis in &result.analyses {
                let mut edge_bindings = IndexMap::new();
                for (qedge_key, bindings) in &analysis.edge_bindings {
                    let mut binding_seen = HashSet::new();
                    let mut new_bindings = Vec::new();
                    for binding in bindings {
                        let mut new_binding = binding.clone();
                        new_binding.id = edge_id_map.get(&binding.id).cloned().unwrap_or_else(|| binding.id.clone());
                        let signature = binding_signature(&new_binding.id, &new_binding.extra);
                        if binding_seen.insert(signature) {
                            new_bindings.push(new_binding);
                        }
                    }
                    edge_bindings.insert(qedge_key.clone(), new_bindings);
                }
                analyses.push(crate::model::Analysis { edge_bindings, extra: analysis.extra.clone() });
            }

            let new_result = Result_ { node_bindings, analyses };
            let canonical = serde_json::to_string(&serde_json::to_value(&new_result)?)?;
            if canonical_seen.insert(canonical) {
                out.push(new_result);
            }
        }

        Ok(out)
    }
}

/// §4.F.1 node-merge rule.
fn merge_into(primary: &mut KNode, incoming: &KNode, merge_count: &mut usize) {
    if incoming.attributes.is_empty() {
        return;
    }
    if *merge_count == 1 {
        for attr in &mut primary.attributes {
            attr.attribute_type_id = format!("{}.1", attr.attribute_type_id);
        }
        for attr in &incoming.attributes {
            let mut attr = attr.clone();
            attr.attribute_type_id = format!("{}.2", attr.attribute_type_id);
            primary.attributes.push(attr);
        }
        *merge_count = 2;
    } else {
        let suffix = *merge_count + 1;
        for attr in &incoming.attributes {
            let mut attr = attr.clone();
            attr.attribute_type_id = format!("{}.{}", attr.attribute_type_id, suffix);
            primary.attributes.push(attr);
        }
        *merge_count += 1;
    }
}

fn ic_attribute(ic: f64) -> Attribute {
    Attribute {
        attribute_type_id: IC_ATTRIBUTE_TYPE.to_string(),
        value: AttributeValue::Scalar(Value::from(ic)),
        value_type_id: Some(IC_VALUE_TYPE.to_string()),
        original_attribute_name: None,
        value_url: None,
        attribute_source: None,
    }
}

fn build_edge_id_map(
    original: &KnowledgeGraph,
    normalized: &KnowledgeGraph,
    node_id_map: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut signature_to_key: HashMap<(String, String, String, String), String> = HashMap::new();
    for (key, edge) in &normalized.edges {
        let hash = attribute_hash_or_fresh(&edge.attributes);
        signature_to_key.insert(
            (edge.subject.clone(), edge.predicate.clone(), edge.object.clone(), hash),
            key.clone(),
        );
    }

    let mut map = HashMap::new();
    for (key, edge) in &original.edges {
        let subject = node_id_map.get(&edge.subject).cloned().unwrap_or_else(|| edge.subject.clone());
        let object = node_id_map.get(&edge.object).cloned().unwrap_or_else(|| edge.object.clone());
        let hash = attribute_hash_or_fresh(&edge.attributes);
        let survivor = signature_to_key
            .get(&(subject, edge.predicate.clone(), object, hash))
            .cloned()
            .unwrap_or_else(|| key.clone());
        map.insert(key.clone(), survivor);
    }
    map
}

fn binding_signature(id: &str, extra: &serde_json::Map<String, Value>) -> String {
    let attrs: Vec<Attribute> = extra
        .get("attributes")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    format!("{id}|{}", attribute_hash_or_fresh(&attrs))
}

/// Computes the attribute-hash of spec.md §4.F, falling back to a fresh
/// unique token (so the containing edge never dedups) when any attribute's
/// value is unhashable (a deeply nested mapping).
pub fn attribute_hash_or_fresh(attributes: &[Attribute]) -> String {
    attribute_hash(attributes).unwrap_or_else(|| format!("unhashable:{}", Uuid::new_v4()))
}

/// `None` means at least one attribute's value is too deeply nested to
/// hash deterministically.
pub fn attribute_hash(attributes: &[Attribute]) -> Option<String> {
    let mut parts = Vec::with_capacity(attributes.len());
    for attr in attributes {
        let value_repr = hash_value(&attr.value)?;
        parts.push(format!(
            "{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}",
            attr.attribute_type_id,
            value_repr,
            attr.original_attribute_name.as_deref().unwrap_or(""),
            attr.value_url.as_deref().unwrap_or(""),
            attr.attribute_source.as_deref().unwrap_or(""),
            attr.value_type_id.as_deref().unwrap_or(""),
            attr.attribute_source.as_deref().unwrap_or(""),
        ));
    }
    let joined = parts.join("\u{2}");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    Some(format!("{:x}", hasher.finalize()))
}

fn hash_value(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Scalar(v) => scalar_repr(v),
        AttributeValue::List(items) => {
            let reprs: Option<Vec<String>> = items.iter().map(scalar_repr).collect();
            Some(format!("[{}]", reprs?.join(",")))
        }
        AttributeValue::Map(map) => {
            let mut parts = Vec::with_capacity(map.len());
            for (k, v) in map {
                let repr = match v {
                    Value::Object(_) => return None,
                    Value::Array(items) => {
                        let reprs: Option<Vec<String>> = items.iter().map(scalar_repr).collect();
                        format!("[{}]", reprs?.join(","))
                    }
                    other => scalar_repr(other)?,
                };
                parts.push(format!("{k}={repr}"));
            }
            Some(format!("{{{}}}", parts.join(";")))
        }
    }
}

fn scalar_repr(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}
