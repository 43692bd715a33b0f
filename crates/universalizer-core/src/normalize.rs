//! Identifier normalization.
//!
//! Every node id is classified once against a [`PrefixRegistry`]:
//!
//! 1. `OBO:`-namespace ids go through [`convert_obo_id`] and are always flagged.
//! 2. Valid CURIEs are kept as-is.
//! 3. Anything else is treated as an IRI and compressed; compressed ids are
//!    remapped and flagged, uncompressible ones are only flagged.
//!
//! Ids without any `prefix:` segment are flagged and skipped. A remap whose
//! target is already taken (by another input id or by an earlier remap) is
//! refused, so two distinct ids never collapse into one.

use crate::diagnostics::{Anomaly, AnomalyKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use universalizer_prefixes::{split_curie, PrefixRegistry};

/// Legacy namespace handled by [`convert_obo_id`].
pub const OBO_NAMESPACE: &str = "OBO";

/// Original id -> canonical id. Absent keys are left unchanged.
pub type IdRemap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdDecision {
    /// Already a valid CURIE.
    Keep,
    /// Rewrite to `new_id`; still reported as `kind`.
    Remap { new_id: String, kind: AnomalyKind },
    /// Leave unchanged but report.
    Flag(AnomalyKind),
}

#[derive(Debug, Clone, Default)]
pub struct IdNormalization {
    pub remap: IdRemap,
    pub anomalies: Vec<Anomaly>,
}

/// Convert a legacy `OBO:` id to CURIE form.
///
/// `OBO:ABC_1234` -> `ABC:1234`. A `#` fragment and everything after it is
/// dropped first; the rest must contain exactly one `_` or exactly one `:`.
/// Only the prefix part is upper-cased. Returns `None` when not convertible.
pub fn convert_obo_id(id: &str) -> Option<String> {
    let (prefix, _) = split_curie(id)?;
    if !prefix.eq_ignore_ascii_case(OBO_NAMESPACE) {
        return None;
    }
    let rest = id.get(OBO_NAMESPACE.len() + 1..)?;
    let rest = match rest.find('#') {
        Some(pos) => &rest[..pos],
        None => rest,
    };

    let underscores = rest.matches('_').count();
    let colons = rest.matches(':').count();
    if underscores != 1 && colons != 1 {
        return None;
    }

    let replaced = rest.replacen('_', ":", 1);
    let (new_prefix, local) = replaced.split_once(':')?;
    if new_prefix.is_empty() || local.is_empty() {
        return None;
    }
    Some(format!("{}:{local}", new_prefix.to_uppercase()))
}

pub struct IdentifierNormalizer<'r> {
    registry: &'r PrefixRegistry,
}

impl<'r> IdentifierNormalizer<'r> {
    pub fn new(registry: &'r PrefixRegistry) -> Self {
        Self { registry }
    }

    /// Decide what to do with a single id, without regard to other ids.
    pub fn classify(&self, id: &str) -> IdDecision {
        let Some((prefix, _)) = split_curie(id) else {
            return IdDecision::Flag(AnomalyKind::MissingPrefix);
        };

        if prefix.eq_ignore_ascii_case(OBO_NAMESPACE) {
            return match convert_obo_id(id) {
                Some(new_id) => IdDecision::Remap {
                    new_id,
                    kind: AnomalyKind::ObsoleteNamespace,
                },
                None => IdDecision::Flag(AnomalyKind::ObsoleteNamespace),
            };
        }

        if self.registry.is_valid_curie(id) {
            return IdDecision::Keep;
        }

        match self.registry.try_compress(id) {
            Some(compressed) => IdDecision::Remap {
                new_id: uppercase_lower_prefix(compressed),
                kind: AnomalyKind::CompressedIri,
            },
            None => IdDecision::Flag(AnomalyKind::Unresolved),
        }
    }

    /// Normalize a list of node ids (order preserved, repeats ignored).
    pub fn normalize<'a, I>(&self, ids: I) -> IdNormalization
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: Vec<&str> = ids.into_iter().collect();
        let observed: HashSet<&str> = ids.iter().copied().collect();
        let mut claimed: HashMap<String, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = IdNormalization::default();

        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.classify(id) {
                IdDecision::Keep => {}
                IdDecision::Flag(kind) => {
                    tracing::debug!(id, ?kind, "unexpected identifier");
                    out.anomalies.push(Anomaly::id(id, kind));
                }
                IdDecision::Remap { new_id, kind } => {
                    if new_id == id {
                        out.anomalies.push(Anomaly::id(id, kind));
                        continue;
                    }
                    if observed.contains(new_id.as_str()) || claimed.contains_key(&new_id) {
                        tracing::warn!(
                            id,
                            target = %new_id,
                            "refusing remap onto an identifier that is already in use"
                        );
                        out.anomalies
                            .push(Anomaly::id(id, AnomalyKind::RemapCollision));
                        continue;
                    }
                    tracing::debug!(id, new_id = %new_id, "remapping identifier");
                    claimed.insert(new_id.clone(), id);
                    out.remap.insert(id.to_string(), new_id);
                    out.anomalies.push(Anomaly::id(id, kind));
                }
            }
        }

        tracing::info!(
            remapped = out.remap.len(),
            unexpected = out.anomalies.len(),
            "normalized identifiers"
        );
        out
    }
}

fn uppercase_lower_prefix(curie: String) -> String {
    match curie.split_once(':') {
        Some((prefix, local)) if prefix.chars().any(|c| c.is_lowercase()) && prefix == prefix.to_lowercase() => {
            format!("{}:{local}", prefix.to_uppercase())
        }
        _ => curie,
    }
}
