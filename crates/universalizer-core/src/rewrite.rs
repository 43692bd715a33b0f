//! Single forward pass over the node and edge tables.
//!
//! Both tables are written to `<table>.tmp` siblings first. The originals are
//! replaced only after both passes finish: they are moved to `<table>.bak`, the
//! staged files are renamed in, and the backups are removed. On any error the
//! backups are moved back and the staged files are removed.
//!
//! Rows keep their own line terminator, so CRLF tables stay CRLF and untouched
//! rows are copied byte for byte.

use crate::categories::CategoryRemap;
use crate::graph::GraphFiles;
use crate::mappings::MappingTables;
use crate::normalize::IdRemap;
use crate::tables::{EdgeRecord, NodeRecord};
use crate::{Result, UniversalizerError};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Every decision the rewriter applies, computed before any file is touched.
#[derive(Debug, Clone, Copy)]
pub struct RewritePlan<'a> {
    pub id_remap: &'a IdRemap,
    pub category_remap: &'a CategoryRemap,
    pub mappings: &'a MappingTables,
    pub edge_removals: &'a BTreeSet<String>,
    pub update_categories: bool,
}

impl<'a> RewritePlan<'a> {
    /// Registry-derived remap first, then the equivalence map, which wins.
    pub fn resolve_id<'s>(&self, id: &'s str) -> &'s str
    where
        'a: 's,
    {
        let id_remap: &'a IdRemap = self.id_remap;
        let id_map: &'a BTreeMap<String, String> = &self.mappings.id_map;
        let normalized = id_remap.get(id).map(String::as_str).unwrap_or(id);
        id_map
            .get(id)
            .or_else(|| id_map.get(normalized))
            .map(String::as_str)
            .unwrap_or(normalized)
    }

    /// Resolved category for a node row, or `None` to keep what it has.
    fn resolve_category(&self, id: &str, new_id: &str) -> Option<&'a str> {
        if !self.update_categories {
            return None;
        }
        let category_map: &'a BTreeMap<String, String> = &self.mappings.category_map;
        let category_remap: &'a CategoryRemap = self.category_remap;
        category_map
            .get(id)
            .or_else(|| category_map.get(new_id))
            .or_else(|| category_remap.get(id))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub nodes_seen: usize,
    pub nodes_updated: usize,
    pub node_ids_remapped: usize,
    pub categories_updated: usize,
    pub edges_seen: usize,
    pub edges_removed: usize,
    pub edge_endpoints_remapped: usize,
    pub malformed_rows: usize,
}

/// Rewrite both tables and swap them in, or leave both untouched.
pub fn rewrite_graph(files: &GraphFiles, plan: &RewritePlan<'_>) -> Result<RewriteStats> {
    let staged_nodes = files.staged_nodes();
    let staged_edges = files.staged_edges();

    let stats = match stage(files, plan) {
        Ok(stats) => stats,
        Err(source) => {
            discard(&staged_nodes);
            discard(&staged_edges);
            return Err(UniversalizerError::Rewrite {
                nodes: files.nodes.clone(),
                edges: files.edges.clone(),
                source,
            });
        }
    };

    if let Err(source) = commit(files) {
        discard(&staged_nodes);
        discard(&staged_edges);
        return Err(UniversalizerError::Rewrite {
            nodes: files.nodes.clone(),
            edges: files.edges.clone(),
            source,
        });
    }

    tracing::info!(
        nodes_updated = stats.nodes_updated,
        ids_remapped = stats.node_ids_remapped,
        categories_updated = stats.categories_updated,
        edges_removed = stats.edges_removed,
        edge_endpoints_remapped = stats.edge_endpoints_remapped,
        "rewrote graph"
    );
    Ok(stats)
}

fn stage(files: &GraphFiles, plan: &RewritePlan<'_>) -> io::Result<RewriteStats> {
    let mut stats = RewriteStats::default();
    rewrite_file(&files.nodes, &files.staged_nodes(), |r, w| {
        rewrite_nodes(r, w, plan, &mut stats)
    })?;
    rewrite_file(&files.edges, &files.staged_edges(), |r, w| {
        rewrite_edges(r, w, plan, &mut stats)
    })?;
    Ok(stats)
}

fn rewrite_file<F>(input: &Path, output: &Path, pass: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn BufRead, &mut dyn Write) -> io::Result<()>,
{
    let mut reader = BufReader::new(fs::File::open(input)?);
    let file = fs::File::create(output)?;
    let mut writer = BufWriter::new(file);
    pass(&mut reader, &mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

/// Swap both staged tables in. Either both originals are replaced or both are
/// back in place when this returns.
fn commit(files: &GraphFiles) -> io::Result<()> {
    let backup_nodes = files.backup_nodes();
    let backup_edges = files.backup_edges();

    fs::rename(&files.nodes, &backup_nodes)?;
    if let Err(err) = fs::rename(&files.edges, &backup_edges) {
        restore(&backup_nodes, &files.nodes);
        return Err(err);
    }

    let swapped = fs::rename(files.staged_nodes(), &files.nodes)
        .and_then(|_| fs::rename(files.staged_edges(), &files.edges));
    if let Err(err) = swapped {
        restore(&backup_nodes, &files.nodes);
        restore(&backup_edges, &files.edges);
        return Err(err);
    }

    discard(&backup_nodes);
    discard(&backup_edges);
    Ok(())
}

fn restore(backup: &Path, original: &Path) {
    if let Err(err) = fs::rename(backup, original) {
        tracing::error!(
            backup = %backup.display(),
            original = %original.display(),
            error = %err,
            "could not restore original table"
        );
    }
}

fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %err, "could not remove leftover file");
        }
    }
}

/// Split a line as returned by `read_line` into content and terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    let content = match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    };
    line.split_at(content.len())
}

/// Copy the header line as is. Returns false on empty input.
fn copy_header(reader: &mut dyn BufRead, writer: &mut dyn Write, buf: &mut String) -> io::Result<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }
    writer.write_all(buf.as_bytes())?;
    Ok(true)
}

/// Copy the header, then rewrite every node row.
pub fn rewrite_nodes(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    plan: &RewritePlan<'_>,
    stats: &mut RewriteStats,
) -> io::Result<()> {
    let mut buf = String::new();
    if !copy_header(reader, writer, &mut buf)? {
        return Ok(());
    }

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let (line, eol) = split_terminator(&buf);
        let mut row = match NodeRecord::parse(line) {
            Ok(row) => row,
            Err(err) => {
                if !line.is_empty() {
                    stats.malformed_rows += 1;
                    tracing::warn!(row = %line, error = %err, "malformed node row passed through");
                }
                writer.write_all(buf.as_bytes())?;
                continue;
            }
        };
        stats.nodes_seen += 1;

        let new_id = plan.resolve_id(&row.id).to_string();
        let new_category = plan.resolve_category(&row.id, &new_id);

        let id_changed = new_id != row.id;
        let category_changed = new_category.is_some_and(|c| c != row.category);
        if !id_changed && !category_changed {
            writer.write_all(buf.as_bytes())?;
            continue;
        }

        if category_changed {
            if let Some(category) = new_category {
                row.category = Cow::Borrowed(category);
            }
            stats.categories_updated += 1;
        }
        if id_changed {
            row.id = Cow::Owned(new_id);
            stats.node_ids_remapped += 1;
        }
        stats.nodes_updated += 1;
        write!(writer, "{}{eol}", row.to_line())?;
    }
    Ok(())
}

/// Copy the header, drop folded edges, and remap subject/object of the rest.
pub fn rewrite_edges(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    plan: &RewritePlan<'_>,
    stats: &mut RewriteStats,
) -> io::Result<()> {
    let mut buf = String::new();
    if !copy_header(reader, writer, &mut buf)? {
        return Ok(());
    }

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let (line, eol) = split_terminator(&buf);
        let mut row = match EdgeRecord::parse(line) {
            Ok(row) => row,
            Err(err) => {
                if !line.is_empty() {
                    stats.malformed_rows += 1;
                    tracing::warn!(row = %line, error = %err, "malformed edge row passed through");
                }
                writer.write_all(buf.as_bytes())?;
                continue;
            }
        };
        stats.edges_seen += 1;

        if plan.edge_removals.contains(row.edge_id) {
            stats.edges_removed += 1;
            continue;
        }

        let subject = plan.resolve_id(&row.subject).to_string();
        let object = plan.resolve_id(&row.object).to_string();
        let mut changed = false;
        if subject != row.subject {
            row.subject = Cow::Owned(subject);
            stats.edge_endpoints_remapped += 1;
            changed = true;
        }
        if object != row.object {
            row.object = Cow::Owned(object);
            stats.edge_endpoints_remapped += 1;
            changed = true;
        }

        if changed {
            write!(writer, "{}{eol}", row.to_line())?;
        } else {
            writer.write_all(buf.as_bytes())?;
        }
    }
    Ok(())
}
