//! End-to-end run over one graph directory.
//!
//! Everything is decided from a read-only pass over both tables; diagnostics
//! are written next; the rewrite is last and is the only step that replaces
//! graph files.

use crate::categories::{CategoryResolution, CategoryResolver, NodeCategories};
use crate::config::NormalizeConfig;
use crate::diagnostics::{
    write_category_diagnostics, write_id_diagnostics, Anomaly, AnomalyKind, DiagnosticPaths,
};
use crate::graph::GraphFiles;
use crate::mappings::MappingTables;
use crate::namespace::NamespaceMap;
use crate::normalize::IdentifierNormalizer;
use crate::oracle::CategoryOracle;
use crate::rewrite::{rewrite_graph, RewritePlan, RewriteStats};
use crate::tables::{EdgeRecord, NodeRecord};
use crate::Result;
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use universalizer_prefixes::PrefixRegistry;

/// Already-loaded inputs for [`run_with`].
#[derive(Clone, Copy)]
pub struct RunOptions<'a> {
    pub registry: &'a PrefixRegistry,
    pub mappings: &'a MappingTables,
    pub namespace_map: Option<&'a NamespaceMap>,
    pub oracle: Option<&'a dyn CategoryOracle>,
    pub update_categories: bool,
    pub write_diagnostics: bool,
}

impl<'a> RunOptions<'a> {
    /// Ids only: no side inputs, categories untouched, diagnostics on.
    pub fn new(registry: &'a PrefixRegistry, mappings: &'a MappingTables) -> Self {
        Self {
            registry,
            mappings,
            namespace_map: None,
            oracle: None,
            update_categories: false,
            write_diagnostics: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub nodes_file: PathBuf,
    pub edges_file: PathBuf,
    /// Size of the registry-derived id remap table.
    pub ids_remapped: usize,
    /// Size of the category remap table (before equivalence mappings).
    pub categories_remapped: usize,
    pub identifier_anomalies: usize,
    pub category_anomalies: usize,
    #[serde(flatten)]
    pub rewrite: RewriteStats,
}

/// Load every side input named by `config` and run.
pub fn run(graph_dir: &Path, config: &NormalizeConfig) -> Result<RunReport> {
    let registry = config.registry()?;
    let mappings = config.mappings()?;
    let namespace_map = config.load_namespace_map()?;
    let oracle = config.oracle()?;

    let options = RunOptions {
        registry: &registry,
        mappings: &mappings,
        namespace_map: namespace_map.as_ref(),
        oracle: oracle.as_ref().map(|o| o as &dyn CategoryOracle),
        update_categories: config.update_categories,
        write_diagnostics: config.write_diagnostics,
    };
    run_with(graph_dir, &options)
}

pub fn run_with(graph_dir: &Path, options: &RunOptions<'_>) -> Result<RunReport> {
    let files = GraphFiles::discover(graph_dir)?;

    let (nodes, mut id_anomalies) = read_node_categories(&files.nodes)?;
    tracing::info!(nodes = nodes.len(), "read node table");

    let normalized = IdentifierNormalizer::new(options.registry).normalize(nodes.ids());
    id_anomalies.extend(normalized.anomalies);

    let categories = if options.update_categories {
        let mut resolver = CategoryResolver::new(&nodes).with_id_remap(&normalized.remap);
        if let Some(map) = options.namespace_map {
            resolver = resolver.with_namespace_map(map);
        }
        let malformed = scan_edges(&files.edges, &mut resolver)?;
        let mut resolution = resolver.finish(options.oracle);
        resolution.anomalies.extend(malformed);
        resolution
    } else {
        CategoryResolution::default()
    };

    if options.write_diagnostics {
        let paths = DiagnosticPaths::in_dir(&files.dir);
        write_id_diagnostics(&paths, &id_anomalies, &normalized.remap)?;
        if options.update_categories {
            write_category_diagnostics(&paths, &categories.anomalies, &categories.remap)?;
        }
    }

    let plan = RewritePlan {
        id_remap: &normalized.remap,
        category_remap: &categories.remap,
        mappings: options.mappings,
        edge_removals: &categories.edge_removals,
        update_categories: options.update_categories,
    };
    let rewrite = rewrite_graph(&files, &plan)?;

    let report = RunReport {
        nodes_file: files.nodes.clone(),
        edges_file: files.edges.clone(),
        ids_remapped: normalized.remap.len(),
        categories_remapped: categories.remap.len(),
        identifier_anomalies: id_anomalies.len(),
        category_anomalies: categories.anomalies.len(),
        rewrite,
    };
    tracing::info!(
        ids_remapped = report.ids_remapped,
        nodes_updated = report.rewrite.nodes_updated,
        categories_updated = report.rewrite.categories_updated,
        edges_removed = report.rewrite.edges_removed,
        unexpected_ids = report.identifier_anomalies,
        unexpected_categories = report.category_anomalies,
        "normalization complete"
    );
    Ok(report)
}

/// First pass over the node table: categories by id, plus short rows.
fn read_node_categories(path: &Path) -> Result<(NodeCategories, Vec<Anomaly>)> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut nodes = NodeCategories::new();
    let mut anomalies = Vec::new();

    for (index, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match NodeRecord::parse(&line) {
            Ok(row) => nodes.insert(&row.id, &row.category),
            Err(err) => {
                tracing::warn!(row = %line, error = %err, "malformed node row");
                anomalies.push(Anomaly::id(row_key(&line, index), AnomalyKind::MalformedRow));
            }
        }
    }
    Ok((nodes, anomalies))
}

/// Feed every edge to the resolver; short rows come back as anomalies.
fn scan_edges(path: &Path, resolver: &mut CategoryResolver<'_>) -> Result<Vec<Anomaly>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut anomalies = Vec::new();

    for (index, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match EdgeRecord::parse(&line) {
            Ok(edge) => resolver.observe_edge(&edge),
            Err(err) => {
                tracing::warn!(row = %line, error = %err, "malformed edge row");
                anomalies.push(Anomaly::category(
                    row_key(&line, index),
                    err.to_string(),
                    AnomalyKind::MalformedRow,
                ));
            }
        }
    }
    Ok(anomalies)
}

/// Side-file key for a row that did not parse: its first field, else `line N`.
fn row_key(line: &str, index: usize) -> String {
    match line.split('\t').next() {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => format!("line {}", index + 1),
    }
}
