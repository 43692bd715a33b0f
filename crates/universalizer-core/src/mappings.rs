//! Equivalence mappings (SSSOM-style TSV) and their merge into lookup tables.
//!
//! Merge rule: rows are applied in input order and later rows overwrite earlier
//! ones for the same subject, independently for the id table and the category
//! table. Files from a directory are read in file-name order, so the result is
//! deterministic across runs.

use crate::{Result, UniversalizerError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SUBJECT_ID: &str = "subject_id";
const OBJECT_ID: &str = "object_id";
const OBJECT_CATEGORY: &str = "object_category";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingRow {
    pub subject_id: Option<String>,
    pub object_id: Option<String>,
    pub object_category: Option<String>,
}

impl MappingRow {
    pub fn new(subject_id: &str, object_id: &str, object_category: &str) -> Self {
        fn opt(s: &str) -> Option<String> {
            (!s.is_empty()).then(|| s.to_string())
        }
        Self {
            subject_id: opt(subject_id),
            object_id: opt(object_id),
            object_category: opt(object_category),
        }
    }
}

/// Merged lookups consumed at rewrite time; both take precedence over anything
/// the engine derives itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTables {
    pub id_map: BTreeMap<String, String>,
    pub category_map: BTreeMap<String, String>,
}

impl MappingTables {
    pub fn is_empty(&self) -> bool {
        self.id_map.is_empty() && self.category_map.is_empty()
    }

    /// Fold one row set into the tables (last writer wins).
    pub fn absorb(&mut self, rows: &[MappingRow]) {
        for row in rows {
            let Some(subject) = row.subject_id.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            if let Some(object) = row.object_id.as_deref() {
                if !object.is_empty() && object != subject {
                    self.id_map.insert(subject.to_string(), object.to_string());
                }
            }
            if let Some(category) = row.object_category.as_deref() {
                if !category.is_empty() {
                    self.category_map
                        .insert(subject.to_string(), category.to_string());
                }
            }
        }
    }
}

/// Merge any number of row sets, in order.
pub fn merge_mappings<'a, I>(row_sets: I) -> MappingTables
where
    I: IntoIterator<Item = &'a [MappingRow]>,
{
    let mut tables = MappingTables::default();
    for rows in row_sets {
        tables.absorb(rows);
    }
    tables
}

/// Read one SSSOM TSV file. `#` metadata lines are skipped; columns are
/// located by header name and any of them may be missing.
pub fn read_mapping_file(path: &Path) -> Result<Vec<MappingRow>> {
    let file = fs::File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if line.starts_with('#') || line.trim().is_empty() {
                    continue;
                }
                break line;
            }
            None => return Ok(Vec::new()),
        }
    };

    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let position = |name: &str| columns.iter().position(|c| *c == name);
    let subject_col = position(SUBJECT_ID);
    let object_col = position(OBJECT_ID);
    let category_col = position(OBJECT_CATEGORY);
    if subject_col.is_none() {
        return Err(UniversalizerError::MappingFile {
            path: path.to_path_buf(),
            message: format!("header has no `{SUBJECT_ID}` column"),
        });
    }

    let mut rows = Vec::new();
    for line in lines {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let get = |col: Option<usize>| col.and_then(|i| fields.get(i)).map(|s| s.trim()).unwrap_or("");
        rows.push(MappingRow::new(
            get(subject_col),
            get(object_col),
            get(category_col),
        ));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read mapping file");
    Ok(rows)
}

/// Expand each path to files: a file stands for itself, a directory for its
/// regular files (not recursive), sorted by name.
pub fn collect_mapping_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|err| UniversalizerError::MappingFile {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
                if entry.file_type().is_file() {
                    out.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            out.push(path.clone());
        } else {
            return Err(UniversalizerError::MappingFile {
                path: path.clone(),
                message: "no such file or directory".to_string(),
            });
        }
    }
    Ok(out)
}

/// Read and merge every mapping file named by `paths`.
pub fn load_mappings(paths: &[PathBuf]) -> Result<MappingTables> {
    let files = collect_mapping_paths(paths)?;
    let mut tables = MappingTables::default();
    for file in &files {
        let rows = read_mapping_file(file)?;
        tables.absorb(&rows);
    }
    if !files.is_empty() {
        tracing::info!(
            files = files.len(),
            id_mappings = tables.id_map.len(),
            category_mappings = tables.category_map.len(),
            "loaded equivalence mappings"
        );
    }
    Ok(tables)
}
