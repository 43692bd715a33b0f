//! Anomaly records and the diagnostic side files written next to the graph.
//!
//! Nothing here is read back by the engine; the files exist for operator review
//! and are rewritten on every run, whether or not the table rewrite succeeds.

use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const UNEXPECTED_IDS_FILE: &str = "unexpected_ids.tsv";
pub const ID_REMAP_FILE: &str = "update_id_maps.tsv";
pub const UNEXPECTED_CATEGORIES_FILE: &str = "unexpected_categories.tsv";
pub const CATEGORY_REMAP_FILE: &str = "update_category_maps.tsv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Identifier in the legacy `OBO:` namespace (converted or not).
    ObsoleteNamespace,
    /// Not a valid CURIE but compressed from IRI form.
    CompressedIri,
    /// Not a valid CURIE and could not be compressed.
    Unresolved,
    /// No colon-delimited prefix at all.
    MissingPrefix,
    /// Canonical form would collide with another identifier.
    RemapCollision,
    /// Row with too few columns.
    MalformedRow,
    /// Same node id listed twice with different categories.
    CategoryConflict,
    /// Oracle category disagrees with an already specific one.
    OracleDisagreement,
    /// `biolink:related_to` a semantic type with no category mapping.
    UnknownSemanticType,
    /// Category assertion about an id that is not in the node table.
    UnknownSubject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub id: String,
    pub kind: AnomalyKind,
    /// Category involved, for category anomalies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Anomaly {
    pub fn id(id: impl Into<String>, kind: AnomalyKind) -> Self {
        Self {
            id: id.into(),
            kind,
            category: None,
        }
    }

    pub fn category(id: impl Into<String>, category: impl Into<String>, kind: AnomalyKind) -> Self {
        Self {
            id: id.into(),
            kind,
            category: Some(category.into()),
        }
    }
}

/// Paths of the four side files for a graph directory.
#[derive(Debug, Clone)]
pub struct DiagnosticPaths {
    pub unexpected_ids: PathBuf,
    pub id_remap: PathBuf,
    pub unexpected_categories: PathBuf,
    pub category_remap: PathBuf,
}

impl DiagnosticPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            unexpected_ids: dir.join(UNEXPECTED_IDS_FILE),
            id_remap: dir.join(ID_REMAP_FILE),
            unexpected_categories: dir.join(UNEXPECTED_CATEGORIES_FILE),
            category_remap: dir.join(CATEGORY_REMAP_FILE),
        }
    }
}

pub fn write_id_diagnostics(
    paths: &DiagnosticPaths,
    anomalies: &[Anomaly],
    remap: &BTreeMap<String, String>,
) -> Result<()> {
    write_tsv(
        &paths.unexpected_ids,
        &["ID"],
        anomalies.iter().map(|a| vec![a.id.as_str()]),
    )?;
    write_tsv(
        &paths.id_remap,
        &["Old ID", "New ID"],
        remap.iter().map(|(old, new)| vec![old.as_str(), new.as_str()]),
    )
}

pub fn write_category_diagnostics(
    paths: &DiagnosticPaths,
    anomalies: &[Anomaly],
    remap: &BTreeMap<String, String>,
) -> Result<()> {
    write_tsv(
        &paths.unexpected_categories,
        &["ID", "Category"],
        anomalies
            .iter()
            .map(|a| vec![a.id.as_str(), a.category.as_deref().unwrap_or("")]),
    )?;
    write_tsv(
        &paths.category_remap,
        &["Old ID", "New Category"],
        remap.iter().map(|(id, cat)| vec![id.as_str(), cat.as_str()]),
    )
}

fn write_tsv<'a, I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let tmp = path.with_extension("tsv.tmp");
    {
        let mut out = BufWriter::new(fs::File::create(&tmp)?);
        writeln!(out, "{}", header.join("\t"))?;
        for row in rows {
            writeln!(out, "{}", row.join("\t"))?;
        }
        out.flush()?;
    }
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "wrote diagnostics");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DiagnosticPaths::in_dir(dir.path());

        let anomalies = vec![Anomaly::id("OBO:X_1", AnomalyKind::ObsoleteNamespace)];
        let mut remap = BTreeMap::new();
        remap.insert("OBO:X_1".to_string(), "X:1".to_string());
        write_id_diagnostics(&paths, &anomalies, &remap).unwrap();

        let ids = fs::read_to_string(&paths.unexpected_ids).unwrap();
        assert_eq!(ids, "ID\nOBO:X_1\n");
        let map = fs::read_to_string(&paths.id_remap).unwrap();
        assert_eq!(map, "Old ID\tNew ID\nOBO:X_1\tX:1\n");

        let cats = vec![Anomaly::category("A:1", "biolink:Gene", AnomalyKind::CategoryConflict)];
        write_category_diagnostics(&paths, &cats, &BTreeMap::new()).unwrap();
        let text = fs::read_to_string(&paths.unexpected_categories).unwrap();
        assert_eq!(text, "ID\tCategory\nA:1\tbiolink:Gene\n");
        let text = fs::read_to_string(&paths.category_remap).unwrap();
        assert_eq!(text, "Old ID\tNew Category\n");
    }
}
