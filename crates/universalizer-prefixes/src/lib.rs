//! Prefix registry for Universalizer.
//!
//! Merges an ordered list of named prefix contexts into one `prefix -> base IRI`
//! map (later contexts win on prefix collision) and derives two converters from
//! it:
//!
//! - a forward converter (CURIE -> IRI), used to decide whether an identifier is
//!   already a valid CURIE, and
//! - a reverse converter (IRI -> CURIE), which also carries a lower-cased copy of
//!   every base IRI so case-mangled IRIs still compress.
//!
//! A registry is a plain value: build as many as you like, with different
//! contexts, side by side.

pub mod context;

pub use context::{PrefixContext, BUILTIN_CONTEXTS};

use std::collections::{BTreeMap, HashMap};

/// Contexts used when the caller does not name any.
pub const DEFAULT_CONTEXTS: [&str; 2] = ["obo", "bioregistry.upper"];

#[derive(Debug, thiserror::Error)]
pub enum PrefixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON in prefix context: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown prefix context `{0}` (not built in and not a readable file)")]
    UnknownContext(String),
    #[error("invalid prefix context `{name}`: {message}")]
    InvalidContext { name: String, message: String },
}

/// Split `prefix:local` at the first colon.
///
/// Returns `None` when there is no colon or the prefix would be empty.
pub fn split_curie(id: &str) -> Option<(&str, &str)> {
    let (prefix, local) = id.split_once(':')?;
    if prefix.is_empty() {
        return None;
    }
    Some((prefix, local))
}

/// Bidirectional CURIE/IRI converter built from merged prefix contexts.
#[derive(Debug, Clone)]
pub struct PrefixRegistry {
    contexts: Vec<String>,
    prefix_map: BTreeMap<String, String>,
    /// `(base, prefix)`, longest base first.
    reverse: Vec<(String, String)>,
}

impl PrefixRegistry {
    /// Build from already-loaded contexts, in override order.
    pub fn from_contexts(contexts: &[PrefixContext]) -> Self {
        let mut prefix_map = BTreeMap::new();
        for ctx in contexts {
            for (prefix, base) in &ctx.prefixes {
                prefix_map.insert(prefix.clone(), base.clone());
            }
        }

        let mut reverse_map: HashMap<String, String> = HashMap::new();
        for (prefix, base) in &prefix_map {
            reverse_map.insert(base.clone(), prefix.clone());
        }
        for (prefix, base) in &prefix_map {
            reverse_map
                .entry(base.to_lowercase())
                .or_insert_with(|| prefix.clone());
        }

        let mut reverse: Vec<(String, String)> = reverse_map.into_iter().collect();
        reverse.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            contexts: contexts.iter().map(|c| c.name.clone()).collect(),
            prefix_map,
            reverse,
        }
    }

    /// Resolve each name (built-in or JSON file path) and merge in order.
    pub fn from_context_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PrefixError> {
        let contexts = names
            .iter()
            .map(|n| PrefixContext::load(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_contexts(&contexts))
    }

    /// Registry over [`DEFAULT_CONTEXTS`].
    pub fn with_default_contexts() -> Result<Self, PrefixError> {
        Self::from_context_names(&DEFAULT_CONTEXTS)
    }

    pub fn context_names(&self) -> &[String] {
        &self.contexts
    }

    pub fn prefix_map(&self) -> &BTreeMap<String, String> {
        &self.prefix_map
    }

    pub fn len(&self) -> usize {
        self.prefix_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix_map.is_empty()
    }

    /// Expand a CURIE with a registered (case-sensitive) prefix.
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = split_curie(curie)?;
        if local.is_empty() {
            return None;
        }
        let base = self.prefix_map.get(prefix)?;
        Some(format!("{base}{local}"))
    }

    /// True when `id` is a CURIE whose prefix is registered and which expands.
    pub fn is_valid_curie(&self, id: &str) -> bool {
        self.expand(id).is_some()
    }

    /// Compress an IRI by the longest matching base IRI.
    pub fn try_compress(&self, uri: &str) -> Option<String> {
        for (base, prefix) in &self.reverse {
            if let Some(local) = uri.strip_prefix(base.as_str()) {
                if !local.is_empty() {
                    return Some(format!("{prefix}:{local}"));
                }
            }
        }
        None
    }
}
