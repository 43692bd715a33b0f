//! Namespace -> default category map (`prefix<TAB>category`).

use crate::{Result, UniversalizerError};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    categories: BTreeMap<String, String>,
}

impl NamespaceMap {
    pub fn new(categories: BTreeMap<String, String>) -> Self {
        Self { categories }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|message| UniversalizerError::NamespaceMap {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse the two-column form. A first line starting with `prefix` or
    /// `namespace` is treated as a header.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut categories = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if lineno == 0 {
                let first = line.split('\t').next().unwrap_or("").to_lowercase();
                if first == "prefix" || first == "namespace" {
                    continue;
                }
            }
            let Some((prefix, category)) = line.split_once('\t') else {
                return Err(format!("line {}: expected `prefix<TAB>category`", lineno + 1));
            };
            let category = category.split('\t').next().unwrap_or("").trim();
            let prefix = prefix.trim().trim_end_matches(':');
            if prefix.is_empty() || category.is_empty() {
                return Err(format!("line {}: empty prefix or category", lineno + 1));
            }
            categories.insert(prefix.to_string(), category.to_string());
        }
        Ok(Self { categories })
    }

    /// Exact prefix match first, then case-insensitive.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        if let Some(cat) = self.categories.get(prefix) {
            return Some(cat);
        }
        self.categories
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(prefix))
            .map(|(_, cat)| cat.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
