//! # Universalizer core
//!
//! Normalizes a KGX graph (one `*nodes.tsv` and one `*edges.tsv`) in place:
//!
//! - node identifiers are brought to registry-backed CURIE form
//!   ([`normalize`]),
//! - node categories are resolved from the node table, a namespace map,
//!   category-asserting edges and an optional oracle ([`categories`]),
//! - SSSOM equivalence mappings override both ([`mappings`]),
//! - and both tables are rewritten in one pass and swapped in together
//!   ([`rewrite`]).
//!
//! [`pipeline::run`] ties these together for a directory.
//!
//! ```no_run
//! use std::path::Path;
//! use universalizer_core::NormalizeConfig;
//!
//! let config = NormalizeConfig {
//!     update_categories: true,
//!     ..NormalizeConfig::default()
//! };
//! let report = universalizer_core::run(Path::new("graph/"), &config)?;
//! println!("{} edges removed", report.rewrite.edges_removed);
//! # Ok::<(), universalizer_core::UniversalizerError>(())
//! ```

pub mod categories;
pub mod config;
pub mod diagnostics;
mod error;
pub mod graph;
pub mod mappings;
pub mod namespace;
pub mod normalize;
pub mod oracle;
pub mod pipeline;
pub mod rewrite;
pub mod sty;
pub mod tables;

pub use categories::{CategoryResolution, CategoryResolver, NodeCategories};
pub use config::NormalizeConfig;
pub use diagnostics::{Anomaly, AnomalyKind};
pub use error::{Result, UniversalizerError};
pub use graph::GraphFiles;
pub use mappings::{merge_mappings, MappingRow, MappingTables};
pub use namespace::NamespaceMap;
pub use normalize::{convert_obo_id, IdNormalization, IdentifierNormalizer};
pub use oracle::{CategoryOracle, DirectoryOracle, OracleError, StaticOracle};
pub use pipeline::{run, run_with, RunOptions, RunReport};
pub use rewrite::{rewrite_graph, RewritePlan, RewriteStats};

pub use universalizer_prefixes::{PrefixRegistry, DEFAULT_CONTEXTS};
