//! External category oracle.
//!
//! The oracle is asked once per run. Ids are grouped by lower-cased prefix and
//! each group is answered independently; a group that cannot be answered
//! (missing resource, unreadable file) is logged and skipped.

use crate::{Result, UniversalizerError};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use universalizer_prefixes::split_curie;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("no category resource for `{group}`: {reason}")]
    Unavailable { group: String, reason: String },
    #[error("IO error while reading `{group}`: {source}")]
    Io {
        group: String,
        #[source]
        source: std::io::Error,
    },
}

/// Answers "what category does this id have" for one prefix group at a time.
pub trait CategoryOracle {
    /// `group` is the lower-cased prefix shared by every id in `ids`.
    /// Ids without an answer are simply absent from the result.
    fn group_categories(
        &self,
        group: &str,
        ids: &[&str],
    ) -> std::result::Result<Vec<(String, String)>, OracleError>;
}

/// Batch query over every id; per-group failures are recovered.
pub fn query_oracle<'a, I>(oracle: &dyn CategoryOracle, ids: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for id in ids {
        if let Some((prefix, _)) = split_curie(id) {
            groups.entry(prefix.to_lowercase()).or_default().push(id);
        }
    }

    tracing::info!(groups = groups.len(), "querying category oracle");
    let mut answers = BTreeMap::new();
    for (group, members) in &groups {
        match oracle.group_categories(group, members) {
            Ok(found) => {
                tracing::debug!(group = %group, answered = found.len(), "oracle group answered");
                for (id, category) in found {
                    if !category.is_empty() {
                        answers.insert(id, category);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(group = %group, error = %err, "oracle group unavailable");
            }
        }
    }
    answers
}

/// In-memory oracle, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    categories: BTreeMap<String, String>,
    unavailable: Vec<String>,
}

impl StaticOracle {
    pub fn new(categories: BTreeMap<String, String>) -> Self {
        Self {
            categories,
            unavailable: Vec::new(),
        }
    }

    /// Make every request for `group` fail.
    pub fn with_unavailable_group(mut self, group: &str) -> Self {
        self.unavailable.push(group.to_lowercase());
        self
    }
}

impl CategoryOracle for StaticOracle {
    fn group_categories(
        &self,
        group: &str,
        ids: &[&str],
    ) -> std::result::Result<Vec<(String, String)>, OracleError> {
        if self.unavailable.iter().any(|g| g == group) {
            return Err(OracleError::Unavailable {
                group: group.to_string(),
                reason: "marked unavailable".to_string(),
            });
        }
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.categories
                    .get(*id)
                    .map(|cat| (id.to_string(), cat.clone()))
            })
            .collect())
    }
}

/// Oracle backed by a directory of `<group>.tsv` files (`id<TAB>category`).
#[derive(Debug, Clone)]
pub struct DirectoryOracle {
    dir: PathBuf,
}

impl DirectoryOracle {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(UniversalizerError::OracleDir(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CategoryOracle for DirectoryOracle {
    fn group_categories(
        &self,
        group: &str,
        ids: &[&str],
    ) -> std::result::Result<Vec<(String, String)>, OracleError> {
        let path = self.dir.join(format!("{group}.tsv"));
        let file = fs::File::open(&path).map_err(|err| OracleError::Unavailable {
            group: group.to_string(),
            reason: format!("{}: {err}", path.display()),
        })?;

        let wanted: std::collections::HashSet<&str> = ids.iter().copied().collect();
        let mut out = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| OracleError::Io {
                group: group.to_string(),
                source,
            })?;
            let Some((id, category)) = line.split_once('\t') else {
                continue;
            };
            let category = category.split('\t').next().unwrap_or("").trim();
            if wanted.contains(id) && !category.is_empty() {
                out.push((id.to_string(), category.to_string()));
            }
        }
        Ok(out)
    }
}
