//! Named prefix contexts.
//!
//! A context is a versioned `prefix -> base IRI` table. Two contexts ship with
//! the crate (`obo` and `bioregistry.upper`); anything else is read from a JSON
//! file, either a flat object or a JSON-LD document with an `@context` member.

use crate::PrefixError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const OBO_CONTEXT: &str = include_str!("../contexts/obo.json");
const BIOREGISTRY_UPPER_CONTEXT: &str = include_str!("../contexts/bioregistry.upper.json");

/// Names of the contexts compiled into the crate.
pub const BUILTIN_CONTEXTS: [&str; 2] = ["obo", "bioregistry.upper"];

/// One named prefix map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixContext {
    pub name: String,
    pub prefixes: BTreeMap<String, String>,
}

impl PrefixContext {
    pub fn new(name: impl Into<String>, prefixes: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            prefixes,
        }
    }

    /// Look up a context compiled into the crate.
    pub fn builtin(name: &str) -> Option<Result<Self, PrefixError>> {
        let text = match name {
            "obo" => OBO_CONTEXT,
            "bioregistry.upper" => BIOREGISTRY_UPPER_CONTEXT,
            _ => return None,
        };
        Some(Self::from_json_str(name, text))
    }

    /// Resolve a context by built-in name, falling back to a JSON file path.
    pub fn load(name: &str) -> Result<Self, PrefixError> {
        if let Some(builtin) = Self::builtin(name) {
            return builtin;
        }
        let path = Path::new(name);
        if path.is_file() {
            return Self::from_json_file(path);
        }
        Err(PrefixError::UnknownContext(name.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PrefixError> {
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();
        Self::from_json_str(&name, &text)
    }

    /// Parse `{"GO": "http://..."}` or `{"@context": {...}}`.
    ///
    /// JSON-LD term definitions of the form `{"@id": "..."}` are accepted;
    /// keywords (`@vocab`, `@base`, ...) and non-string values are skipped.
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, PrefixError> {
        let value: Value = serde_json::from_str(text)?;
        let object = match &value {
            Value::Object(map) => match map.get("@context") {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(PrefixError::InvalidContext {
                        name: name.to_string(),
                        message: "`@context` must be an object".to_string(),
                    })
                }
                None => map,
            },
            _ => {
                return Err(PrefixError::InvalidContext {
                    name: name.to_string(),
                    message: "expected a JSON object".to_string(),
                })
            }
        };

        let mut prefixes = BTreeMap::new();
        for (prefix, term) in object {
            if prefix.starts_with('@') || prefix.is_empty() {
                continue;
            }
            let base = match term {
                Value::String(s) => s.as_str(),
                Value::Object(def) => match def.get("@id") {
                    Some(Value::String(s)) => s.as_str(),
                    _ => continue,
                },
                _ => continue,
            };
            if base.is_empty() {
                continue;
            }
            prefixes.insert(prefix.clone(), base.to_string());
        }

        Ok(Self::new(name, prefixes))
    }
}
