//! KGX TSV rows.
//!
//! Node rows are `id, category, ...`; edge rows are
//! `edge_id, subject, predicate, object, ...`. Trailing columns are opaque and
//! carried through untouched. Rows borrow from the line they were parsed from.

use std::borrow::Cow;

pub const NODE_TABLE_SUFFIX: &str = "nodes.tsv";
pub const EDGE_TABLE_SUFFIX: &str = "edges.tsv";

const NODE_ARITY: usize = 2;
const EDGE_ARITY: usize = 4;

/// A row with fewer columns than its table requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected at least {expected} tab-separated fields, found {found}")]
pub struct RowError {
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord<'a> {
    pub id: Cow<'a, str>,
    pub category: Cow<'a, str>,
    pub rest: Vec<&'a str>,
}

impl<'a> NodeRecord<'a> {
    pub fn parse(line: &'a str) -> Result<Self, RowError> {
        let mut fields = line.split('\t');
        let found = line.split('\t').count();
        match (fields.next(), fields.next()) {
            (Some(id), Some(category)) => Ok(Self {
                id: Cow::Borrowed(id),
                category: Cow::Borrowed(category),
                rest: fields.collect(),
            }),
            _ => Err(RowError {
                expected: NODE_ARITY,
                found,
            }),
        }
    }

    pub fn to_line(&self) -> String {
        let mut out = String::with_capacity(self.id.len() + self.category.len() + 16);
        out.push_str(&self.id);
        out.push('\t');
        out.push_str(&self.category);
        for field in &self.rest {
            out.push('\t');
            out.push_str(field);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord<'a> {
    pub edge_id: &'a str,
    pub subject: Cow<'a, str>,
    pub predicate: &'a str,
    pub object: Cow<'a, str>,
    pub rest: Vec<&'a str>,
}

impl<'a> EdgeRecord<'a> {
    pub fn parse(line: &'a str) -> Result<Self, RowError> {
        let mut fields = line.split('\t');
        let found = line.split('\t').count();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(edge_id), Some(subject), Some(predicate), Some(object)) => Ok(Self {
                edge_id,
                subject: Cow::Borrowed(subject),
                predicate,
                object: Cow::Borrowed(object),
                rest: fields.collect(),
            }),
            _ => Err(RowError {
                expected: EDGE_ARITY,
                found,
            }),
        }
    }

    pub fn to_line(&self) -> String {
        let mut out = String::with_capacity(
            self.edge_id.len() + self.subject.len() + self.predicate.len() + self.object.len() + 16,
        );
        out.push_str(self.edge_id);
        out.push('\t');
        out.push_str(&self.subject);
        out.push('\t');
        out.push_str(self.predicate);
        out.push('\t');
        out.push_str(&self.object);
        for field in &self.rest {
            out.push('\t');
            out.push_str(field);
        }
        out
    }
}
