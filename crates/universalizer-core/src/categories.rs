//! Category resolution.
//!
//! One category decision per node, from lowest to highest precedence:
//!
//! 1. the category in the node table (first listing of an id wins),
//! 2. empty or `biolink:OntologyClass` collapses to `biolink:NamedThing`,
//! 3. the namespace map, only over an uninformative category,
//! 4. `biolink:category` edges and `biolink:related_to` edges pointing at a
//!    UMLS semantic type, unconditionally (the edge is then dropped),
//! 5. the external oracle, only over an uninformative category; a differing
//!    answer for an already specific node is reported instead.
//!
//! Equivalence-mapping categories sit above all of these and are applied by the
//! rewriter. The oracle-below-mappings order is inherited behavior, not a
//! confirmed requirement; keep it unless the data owners say otherwise.

use crate::diagnostics::{Anomaly, AnomalyKind};
use crate::namespace::NamespaceMap;
use crate::normalize::IdRemap;
use crate::oracle::{query_oracle, CategoryOracle};
use crate::sty::{category_for_code, semantic_type_code};
use crate::tables::EdgeRecord;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use universalizer_prefixes::split_curie;

pub const CATEGORY_PREDICATE: &str = "biolink:category";
pub const RELATED_TO_PREDICATE: &str = "biolink:related_to";
pub const PLACEHOLDER_CATEGORY: &str = "biolink:OntologyClass";
pub const GENERIC_CATEGORY: &str = "biolink:NamedThing";

/// Node id (as found in the node table) -> replacement category.
pub type CategoryRemap = BTreeMap<String, String>;

/// Empty or the ontology-class placeholder.
pub fn is_placeholder(category: &str) -> bool {
    category.is_empty() || category == PLACEHOLDER_CATEGORY
}

/// Placeholder or the generic fallback: anything a weaker source may replace.
pub fn is_uninformative(category: &str) -> bool {
    is_placeholder(category) || category == GENERIC_CATEGORY
}

/// Categories as listed in the node table, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct NodeCategories {
    order: Vec<String>,
    categories: HashMap<String, String>,
    conflicts: Vec<Anomaly>,
}

impl NodeCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row. A repeated id keeps its first category; a different one
    /// is reported as a conflict.
    pub fn insert(&mut self, id: &str, category: &str) {
        match self.categories.get(id) {
            Some(existing) if existing == category => {}
            Some(existing) => {
                tracing::warn!(
                    id,
                    kept = %existing,
                    ignored = category,
                    "conflicting categories for one node"
                );
                self.conflicts.push(Anomaly::category(
                    id,
                    category,
                    AnomalyKind::CategoryConflict,
                ));
            }
            None => {
                self.order.push(id.to_string());
                self.categories.insert(id.to_string(), category.to_string());
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.categories.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn conflicts(&self) -> &[Anomaly] {
        &self.conflicts
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryResolution {
    pub remap: CategoryRemap,
    pub edge_removals: BTreeSet<String>,
    pub anomalies: Vec<Anomaly>,
}

pub struct CategoryResolver<'a> {
    nodes: &'a NodeCategories,
    id_remap: Option<&'a IdRemap>,
    /// Canonical id -> node-table id, for edges that already use the new form.
    by_canonical: HashMap<&'a str, &'a str>,
    namespace_map: Option<&'a NamespaceMap>,
    edge_assertions: HashMap<String, String>,
    edge_removals: BTreeSet<String>,
    anomalies: Vec<Anomaly>,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(nodes: &'a NodeCategories) -> Self {
        Self {
            nodes,
            id_remap: None,
            by_canonical: HashMap::new(),
            namespace_map: None,
            edge_assertions: HashMap::new(),
            edge_removals: BTreeSet::new(),
            anomalies: Vec::new(),
        }
    }

    /// Use canonical ids for namespace lookups and oracle queries, and accept
    /// them as edge subjects.
    pub fn with_id_remap(mut self, remap: &'a IdRemap) -> Self {
        self.id_remap = Some(remap);
        self.by_canonical = remap
            .iter()
            .filter(|(old, _)| self.nodes.contains(old))
            .map(|(old, new)| (new.as_str(), old.as_str()))
            .collect();
        self
    }

    pub fn with_namespace_map(mut self, map: &'a NamespaceMap) -> Self {
        self.namespace_map = Some(map);
        self
    }

    fn canonical<'s>(&self, id: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.id_remap
            .and_then(|remap| remap.get(id))
            .map(String::as_str)
            .unwrap_or(id)
    }

    /// Look at one edge; category-asserting edges are folded into their subject.
    pub fn observe_edge(&mut self, edge: &EdgeRecord<'_>) {
        let object = edge.object.as_ref();
        let asserted = match edge.predicate {
            CATEGORY_PREDICATE => {
                if is_placeholder(object) {
                    return;
                }
                object.to_string()
            }
            RELATED_TO_PREDICATE => {
                let Some(code) = semantic_type_code(object) else {
                    return;
                };
                match category_for_code(code) {
                    Some(category) => category.to_string(),
                    None => {
                        self.anomalies.push(Anomaly::category(
                            edge.subject.as_ref(),
                            object,
                            AnomalyKind::UnknownSemanticType,
                        ));
                        return;
                    }
                }
            }
            _ => return,
        };

        if edge.edge_id.is_empty() {
            tracing::debug!(subject = %edge.subject, "category edge without id left in place");
            return;
        }
        let subject = edge.subject.as_ref();
        let node = if self.nodes.contains(subject) {
            subject
        } else if let Some(node) = self.by_canonical.get(subject).copied() {
            node
        } else {
            self.anomalies.push(Anomaly::category(
                subject,
                asserted,
                AnomalyKind::UnknownSubject,
            ));
            return;
        };

        self.edge_assertions.insert(node.to_string(), asserted);
        self.edge_removals.insert(edge.edge_id.to_string());
    }

    /// Apply every source in precedence order and produce the remap table.
    pub fn finish(mut self, oracle: Option<&dyn CategoryOracle>) -> CategoryResolution {
        let nodes = self.nodes;
        let mut decided: HashMap<&str, String> = HashMap::with_capacity(nodes.len());

        for id in nodes.ids() {
            let mut category = nodes.get(id).unwrap_or("").to_string();

            if is_placeholder(&category) {
                category = GENERIC_CATEGORY.to_string();
            }

            if let Some(map) = self.namespace_map {
                if is_uninformative(&category) {
                    let mapped = split_curie(self.canonical(id)).and_then(|(p, _)| map.get(p));
                    if let Some(mapped) = mapped {
                        category = mapped.to_string();
                    }
                }
            }

            if let Some(asserted) = self.edge_assertions.get(id) {
                category = asserted.clone();
            }

            decided.insert(id, category);
        }

        if let Some(oracle) = oracle {
            let queried: HashMap<&str, &str> = nodes
                .ids()
                .map(|id| (self.canonical(id), id))
                .collect();
            let answers = query_oracle(oracle, queried.keys().copied());
            for (canonical, answer) in answers {
                let Some(id) = queried.get(canonical.as_str()).copied() else {
                    continue;
                };
                let Some(current) = decided.get_mut(id) else {
                    continue;
                };
                if is_uninformative(current) {
                    *current = answer;
                } else if *current != answer {
                    tracing::debug!(id, kept = %current, oracle = %answer, "oracle disagrees");
                    self.anomalies.push(Anomaly::category(
                        id,
                        answer,
                        AnomalyKind::OracleDisagreement,
                    ));
                }
            }
        }

        let mut remap = CategoryRemap::new();
        for id in nodes.ids() {
            let original = nodes.get(id).unwrap_or("");
            if let Some(category) = decided.get(id) {
                if category != original {
                    remap.insert(id.to_string(), category.clone());
                }
            }
        }

        let mut anomalies = nodes.conflicts().to_vec();
        anomalies.append(&mut self.anomalies);

        tracing::info!(
            categories_remapped = remap.len(),
            edges_to_remove = self.edge_removals.len(),
            unexpected = anomalies.len(),
            "resolved categories"
        );

        CategoryResolution {
            remap,
            edge_removals: self.edge_removals,
            anomalies,
        }
    }
}
