//! Locate the node/edge table pair in a graph directory.

use crate::tables::{EDGE_TABLE_SUFFIX, NODE_TABLE_SUFFIX};
use crate::{Result, UniversalizerError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The two tables of one KGX graph, plus where their rewrites are staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFiles {
    pub dir: PathBuf,
    pub nodes: PathBuf,
    pub edges: PathBuf,
}

impl GraphFiles {
    /// Scan `dir` (non-recursively) for exactly one `*nodes.tsv` and one `*edges.tsv`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let structural = |message: String| UniversalizerError::GraphFiles {
            dir: dir.to_path_buf(),
            message,
        };

        if !dir.is_dir() {
            return Err(structural("not a directory".to_string()));
        }

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| structural(err.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name.ends_with(NODE_TABLE_SUFFIX) {
                nodes.push(entry.into_path());
            } else if name.ends_with(EDGE_TABLE_SUFFIX) {
                edges.push(entry.into_path());
            }
        }

        let found = nodes.len() + edges.len();
        if found == 0 {
            return Err(structural("found no graph files".to_string()));
        }
        if nodes.len() != 1 || edges.len() != 1 {
            return Err(structural(format!(
                "expected one node table and one edge table, found {} node and {} edge tables ({})",
                nodes.len(),
                edges.len(),
                nodes
                    .iter()
                    .chain(edges.iter())
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let files = Self {
            dir: dir.to_path_buf(),
            nodes: nodes.remove(0),
            edges: edges.remove(0),
        };
        tracing::info!(
            nodes = %files.nodes.display(),
            edges = %files.edges.display(),
            "found graph files"
        );
        Ok(files)
    }

    pub fn staged_nodes(&self) -> PathBuf {
        staged(&self.nodes)
    }

    pub fn staged_edges(&self) -> PathBuf {
        staged(&self.edges)
    }

    /// Where the original node table waits while the staged one is swapped in.
    pub fn backup_nodes(&self) -> PathBuf {
        with_suffix(&self.nodes, ".bak")
    }

    pub fn backup_edges(&self) -> PathBuf {
        with_suffix(&self.edges, ".bak")
    }
}

fn staged(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "id\tcategory\n").unwrap();
    }

    #[test]
    fn finds_the_pair_and_ignores_side_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "kg_nodes.tsv");
        touch(dir.path(), "kg_edges.tsv");
        touch(dir.path(), "unexpected_ids.tsv");
        touch(dir.path(), "update_id_maps.tsv");

        let files = GraphFiles::discover(dir.path()).unwrap();
        assert!(files.nodes.ends_with("kg_nodes.tsv"));
        assert!(files.edges.ends_with("kg_edges.tsv"));
        assert!(files.staged_nodes().ends_with("kg_nodes.tsv.tmp"));
        assert!(files.backup_edges().ends_with("kg_edges.tsv.bak"));
    }

    #[test]
    fn leftover_staged_and_backup_files_are_not_tables() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "kg_nodes.tsv");
        touch(dir.path(), "kg_edges.tsv");
        touch(dir.path(), "kg_nodes.tsv.tmp");
        touch(dir.path(), "kg_edges.tsv.bak");
        fs::create_dir(dir.path().join("old_nodes.tsv")).unwrap();

        let files = GraphFiles::discover(dir.path()).unwrap();
        assert!(files.nodes.ends_with("kg_nodes.tsv"));
        assert!(files.edges.ends_with("kg_edges.tsv"));
    }

    #[test]
    fn empty_directory_is_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphFiles::discover(dir.path()).unwrap_err();
        assert!(matches!(err, UniversalizerError::GraphFiles { .. }));
    }

    #[test]
    fn extra_node_table_is_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a_nodes.tsv");
        touch(dir.path(), "b_nodes.tsv");
        touch(dir.path(), "a_edges.tsv");
        let err = GraphFiles::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("found 2 node and 1 edge tables"));
    }

    #[test]
    fn missing_edge_table_is_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nodes.tsv");
        assert!(GraphFiles::discover(dir.path()).is_err());
    }
}
