//! Clique Resolver (spec.md §4.D) and Conflation Layer (spec.md §4.E).
//!
//! Grounded on the batch-then-assemble shape of a multi-source repository
//! fetch: gather every remote list up front, then assemble in memory with
//! no further suspension points, matching spec.md §5's "no suspension
//! inside clique-assembly" rule.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::curie::lookup_key;
use crate::error::{NormalizerError, Result};
use crate::label_policy::{self, LabelPolicyConfig};
use crate::model::{
    round_ic, Category, CliqueMember, CliqueRecord, EquivalentIdentifier, IdentifierRef,
};
use crate::ontology::{without_entity_root, Ancestors, NAMED_THING};
use crate::store::{MultiStore, StoreName};

/// Which conflation overlays to apply when resolving a clique. Both are
/// independent; either, neither, or both may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflationFlags {
    pub gene_protein: bool,
    pub chemical_drug: bool,
}

impl ConflationFlags {
    pub fn none() -> Self {
        ConflationFlags::default()
    }

    fn stores(&self) -> Vec<StoreName> {
        let mut out = Vec::with_capacity(2);
        if self.gene_protein {
            out.push(StoreName::ConflationGeneProtein);
        }
        if self.chemical_drug {
            out.push(StoreName::ConflationDrugChemical);
        }
        out
    }
}

/// The fully-specified "valid flag name" universe surfaced to HTTP callers
/// (spec.md §4.G step 1, §6 `/get_allowed_conflations`).
pub const ALLOWED_CONFLATIONS: &[&str] = &["GeneProtein", "DrugChemical"];

/// Parses a caller-supplied conflation name list into [`ConflationFlags`],
/// rejecting anything outside [`ALLOWED_CONFLATIONS`].
pub fn parse_conflation_names(names: &[String]) -> Result<ConflationFlags> {
    let mut flags = ConflationFlags::none();
    for name in names {
        match name.as_str() {
            "GeneProtein" => flags.gene_protein = true,
            "DrugChemical" => flags.chemical_drug = true,
            other => {
                return Err(NormalizerError::ValidationError(format!(
                    "unknown conflation flag: {other}"
                )))
            }
        }
    }
    Ok(flags)
}

/// Per-canonical assembled clique state, built in steps 2-4 and consumed in
/// step 5 of spec.md §4.D.
#[derive(Clone)]
struct CanonState {
    members: Vec<CliqueMember>,
    categories: Vec<Category>,
    information_content: Option<f64>,
}

/// Options controlling which optional fields `normalize` fills in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub conflation: ConflationFlags,
    pub include_descriptions: bool,
    pub include_individual_types: bool,
}

pub struct Resolver {
    store: Arc<dyn MultiStore>,
    ancestors: Arc<dyn Ancestors>,
    labels: Arc<LabelPolicyConfig>,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn MultiStore>,
        ancestors: Arc<dyn Ancestors>,
        labels: Arc<LabelPolicyConfig>,
    ) -> Self {
        Resolver { store, ancestors, labels }
    }

    /// `normalize` per spec.md §4.D. Returns one entry per input CURIE, in
    /// input order; the value is `None` when the CURIE has no clique.
    pub async fn normalize(
        &self,
        curies: &[String],
        options: NormalizeOptions,
    ) -> Result<Vec<(String, Option<CliqueRecord>)>> {
        if curies.is_empty() {
            return Ok(Vec::new());
        }

        // Step 1: canonicalize keys.
        let keys: Vec<String> = curies.iter().map(|c| lookup_key(c)).collect();
        let canons = self.store.multi_get(StoreName::EqToCanonical, &keys).await?;

        // First-occurrence-ordered list of distinct present canonicals.
        let mut order = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for canon in canons.iter().flatten() {
            if seen.insert(canon.clone()) {
                order.push(canon.clone());
            }
        }

        let mut state = self.gather(&order).await?;
        self.apply_conflation(&mut state, &order, options.conflation).await?;

        let mut out = Vec::with_capacity(curies.len());
        for (i, curie) in curies.iter().enumerate() {
            let record = match &canons[i] {
                None => None,
                Some(canon) => state
                    .get(canon)
                    .and_then(|s| self.build_record(s, options)),
            };
            out.push((curie.clone(), record));
        }
        Ok(out)
    }

    /// Steps 2-3: fetch members/category/ic for `canons` and expand leaf
    /// categories to their ancestor chains.
    async fn gather(&self, canons: &[String]) -> Result<HashMap<String, CanonState>> {
        if canons.is_empty() {
            return Ok(HashMap::new());
        }
        let ic_raw = self.store.multi_get(StoreName::CanonToIc, canons).await?;
        let members_raw = self.store.multi_get(StoreName::CanonToMembers, canons).await?;
        let category_raw = self.store.multi_get(StoreName::CanonToCategory, canons).await?;

        let mut out = HashMap::with_capacity(canons.len());
        for (i, canon) in canons.iter().enumerate() {
            let leaf = category_raw[i].clone().unwrap_or_else(|| {
                warn!(canonical = %canon, "canon->category missing; substituting universal root");
                NAMED_THING.to_string()
            });
            let mut members = parse_members(canon, &members_raw[i]);
            for member in &mut members {
                member.category = Some(vec![leaf.clone()]);
            }
            let categories = self.ancestors.ancestors(&leaf);
            let information_content = ic_raw[i]
                .as_ref()
                .and_then(|s| s.parse::<f64>().ok())
                .map(round_ic);
            out.insert(
                canon.clone(),
                CanonState { members, categories, information_content },
            );
        }
        Ok(out)
    }

    /// Step 4: apply gene/protein and drug/chemical conflation overlays.
    async fn apply_conflation(
        &self,
        state: &mut HashMap<String, CanonState>,
        canons: &[String],
        flags: ConflationFlags,
    ) -> Result<()> {
        let stores = flags.stores();
        if stores.is_empty() || canons.is_empty() {
            return Ok(());
        }

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for store_name in stores {
            let lists = self.store.multi_get(store_name, canons).await?;
            for (canon, raw) in canons.iter().zip(lists.into_iter()) {
                let Some(raw) = raw else { continue };
                let Ok(ys) = serde_json::from_str::<Vec<String>>(&raw) else {
                    warn!(canonical = %canon, "malformed conflation list");
                    continue;
                };
                let entry = grouped.entry(canon.clone()).or_default();
                for y in ys {
                    if !entry.contains(&y) {
                        entry.push(y);
                    }
                }
            }
        }

        // One batched fetch for every id referenced by any conflation group,
        // per spec.md §5's "one multiGet per store per logical step" rule.
        let mut all_ys = Vec::new();
        let mut seen_ys = std::collections::HashSet::new();
        for ys in grouped.values() {
            for y in ys {
                if seen_ys.insert(y.clone()) {
                    all_ys.push(y.clone());
                }
            }
        }
        let conflated = self.gather(&all_ys).await?;

        for (canon, ys) in grouped {
            if ys.is_empty() {
                continue;
            }
            let mut members = Vec::new();
            let mut categories = Vec::new();
            for y in &ys {
                if let Some(s) = conflated.get(y) {
                    members.extend(s.members.iter().cloned());
                    categories.extend(s.categories.iter().cloned());
                }
            }
            dedup_preserve_order(&mut categories);

            if let Some(entry) = state.get_mut(&canon) {
                entry.members = members;
                entry.categories = categories;
            }
        }
        Ok(())
    }

    /// Step 5: assemble a [`CliqueRecord`] from assembled clique state.
    fn build_record(&self, state: &CanonState, options: NormalizeOptions) -> Option<CliqueRecord> {
        let members: Vec<CliqueMember> = state
            .members
            .iter()
            .filter(|m| !m.identifier.is_empty())
            .cloned()
            .collect();
        if members.is_empty() {
            return None;
        }

        let label = label_policy::preferred_label(&members, &state.categories, &self.labels);
        let preferred = &members[0];
        let description = if options.include_descriptions {
            members.iter().find_map(|m| m.first_description().map(|d| d.to_string()))
        } else {
            None
        };

        let equivalent_identifiers = members
            .iter()
            .map(|m| EquivalentIdentifier {
                identifier: m.identifier.clone(),
                label: m.label.clone(),
                description: if options.include_descriptions {
                    m.first_description().map(|d| d.to_string())
                } else {
                    None
                },
                category: if options.include_individual_types {
                    m.category.as_ref().and_then(|c| c.last().cloned())
                } else {
                    None
                },
            })
            .collect();

        Some(CliqueRecord {
            preferred: IdentifierRef {
                identifier: preferred.identifier.clone(),
                label,
                description,
            },
            equivalent_identifiers,
            categories: without_entity_root(&state.categories),
            information_content: state.information_content,
        })
    }
}

fn parse_members(canon: &str, raw: &Option<String>) -> Vec<CliqueMember> {
    match raw {
        None => Vec::new(),
        Some(json) => serde_json::from_str(json).unwrap_or_else(|err| {
            warn!(canonical = %canon, %err, "malformed canon->members value");
            Vec::new()
        }),
    }
}

fn dedup_preserve_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}
