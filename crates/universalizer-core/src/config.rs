//! Run configuration, loadable from JSON and overridable from the command line.

use crate::mappings::{load_mappings, MappingTables};
use crate::namespace::NamespaceMap;
use crate::oracle::DirectoryOracle;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use universalizer_prefixes::{PrefixRegistry, DEFAULT_CONTEXTS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Prefix contexts, later ones overriding earlier ones. Built-in names or
    /// paths to JSON context files.
    pub contexts: Vec<String>,
    /// Resolve and rewrite node categories; ids are normalized regardless.
    pub update_categories: bool,
    /// Two-column `prefix<TAB>category` file.
    pub namespace_map: Option<PathBuf>,
    /// SSSOM files or directories of them, merged in order.
    pub map_paths: Vec<PathBuf>,
    /// Directory of `<prefix>.tsv` category files; enables the oracle.
    pub oracle_dir: Option<PathBuf>,
    pub write_diagnostics: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            contexts: DEFAULT_CONTEXTS.iter().map(|c| c.to_string()).collect(),
            update_categories: false,
            namespace_map: None,
            map_paths: Vec::new(),
            oracle_dir: None,
            write_diagnostics: true,
        }
    }
}

impl NormalizeConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn registry(&self) -> Result<PrefixRegistry> {
        let registry = PrefixRegistry::from_context_names(&self.contexts)?;
        tracing::info!(
            contexts = %self.contexts.join(","),
            prefixes = registry.len(),
            "built prefix registry"
        );
        Ok(registry)
    }

    pub fn mappings(&self) -> Result<MappingTables> {
        load_mappings(&self.map_paths)
    }

    pub fn load_namespace_map(&self) -> Result<Option<NamespaceMap>> {
        self.namespace_map
            .as_deref()
            .map(NamespaceMap::from_file)
            .transpose()
    }

    pub fn oracle(&self) -> Result<Option<DirectoryOracle>> {
        self.oracle_dir
            .as_deref()
            .map(DirectoryOracle::open)
            .transpose()
    }
}
