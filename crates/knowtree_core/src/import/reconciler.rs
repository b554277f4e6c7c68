//! Tabular import reconciliation.
//!
//! # Responsibility
//! - Turn flat rows plus a column mapping into one single-rooted tree.
//! - Resolve loose parent references against 1-based row numbers.
//!
//! # Invariants
//! - N input rows always produce exactly N+1 nodes (rows + synthetic root).
//! - Rows with missing, unresolvable, self or cycle-closing parent references
//!   attach to the synthetic root; no row is ever dropped.
//! - Children keep row order under every parent.

use crate::import::rows::{cell_text, FieldMap, RawRow};
use crate::model::node::{normalize_tags, ExternalLink, Node, NodeKind};
use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Wrapper title used when the caller passes a blank root title.
pub const DEFAULT_ROOT_TITLE: &str = "Imported";

/// Why a row with a parent reference was attached to the root instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// Reference names no existing row.
    Missing,
    /// Reference names the row itself.
    SelfReference,
    /// Linking would close a parent cycle.
    Cycle,
}

/// Row that fell back to the synthetic root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRow {
    /// 1-based row number.
    pub row: usize,
    /// Raw parent reference as it appeared in the row.
    pub reference: String,
    pub reason: OrphanReason,
}

/// Reconciliation summary for callers that surface import feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub row_count: usize,
    /// Rows attached under another row.
    pub linked: usize,
    /// Rows with no parent reference at all.
    pub top_level: usize,
    /// Rows whose parent reference could not be honored.
    pub orphans: Vec<OrphanRow>,
}

/// Reconstructs a tree from `rows` and wraps it in a synthetic root.
///
/// Never fails; malformed rows degrade to defaults.
pub fn reconcile(rows: &[RawRow], mapping: &FieldMap, root_title: &str) -> Node {
    reconcile_with_report(rows, mapping, root_title).0
}

/// Same as [`reconcile`], also returning linking statistics.
pub fn reconcile_with_report(
    rows: &[RawRow],
    mapping: &FieldMap,
    root_title: &str,
) -> (Node, ImportReport) {
    let mut root = Node::new(NodeKind::Container, root_title_or_default(root_title));
    root.is_generated = true;

    let mut report = ImportReport {
        row_count: rows.len(),
        ..ImportReport::default()
    };

    // Normalize + index pass. Row numbers are 1-based.
    let mut nodes: Vec<Option<Node>> = Vec::with_capacity(rows.len());
    let mut references: Vec<String> = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        nodes.push(Some(standardize_row(row, index + 1, mapping)));
        references.push(cell_text(row, mapping.parent.as_deref()));
    }

    // Linking pass: parent_of[row] = parent row, both 1-based.
    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    let mut chains = ChainRoots::new(rows.len());
    for (index, reference) in references.iter().enumerate() {
        let row = index + 1;
        if is_blank_reference(reference) {
            report.top_level += 1;
            continue;
        }
        let reason = match resolve_reference(reference, rows.len()) {
            None => Some(OrphanReason::Missing),
            Some(parent) if parent == row => Some(OrphanReason::SelfReference),
            Some(parent) if chains.top_of(parent) == row => Some(OrphanReason::Cycle),
            Some(parent) => {
                parent_of.insert(row, parent);
                chains.attach(row, parent);
                None
            }
        };
        match reason {
            Some(reason) => report.orphans.push(OrphanRow {
                row,
                reference: reference.clone(),
                reason,
            }),
            None => report.linked += 1,
        }
    }

    // Assemble bottom-up so every child subtree is complete before it moves
    // into its parent.
    let mut child_rows: HashMap<usize, Vec<usize>> = HashMap::new();
    for row in 1..=rows.len() {
        if let Some(parent) = parent_of.get(&row) {
            child_rows.entry(*parent).or_default().push(row);
        }
    }
    for row in post_order(rows.len(), &parent_of, &child_rows) {
        let Some(parent) = parent_of.get(&row).copied() else {
            continue;
        };
        let child = nodes[row - 1].take();
        if let (Some(child), Some(parent_node)) = (child, nodes[parent - 1].as_mut()) {
            parent_node.add_child(child);
        }
    }
    for node in nodes.into_iter().flatten() {
        root.add_child(node);
    }

    info!(
        "event=import_reconcile module=import status=ok rows={} linked={} top_level={} orphans={}",
        report.row_count,
        report.linked,
        report.top_level,
        report.orphans.len()
    );
    (root, report)
}

/// Titles in the batch that repeat within it or match `existing_titles`.
///
/// Comparison is trimmed and case-insensitive. Advisory pre-check only;
/// reconciliation accepts duplicates.
pub fn duplicate_titles<'a, I>(
    rows: &[RawRow],
    mapping: &FieldMap,
    existing_titles: I,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = existing_titles
        .into_iter()
        .map(|title| title.trim().to_lowercase())
        .collect();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let title = row_title(row, index + 1, mapping);
        let key = title.to_lowercase();
        if !seen.insert(key.clone()) && reported.insert(key) {
            duplicates.push(title);
        }
    }
    debug!(
        "event=import_duplicate_check module=import status=ok rows={} duplicates={}",
        rows.len(),
        duplicates.len()
    );
    duplicates
}

fn standardize_row(row: &RawRow, row_number: usize, mapping: &FieldMap) -> Node {
    let mut node = Node::new(
        parse_row_kind(&cell_text(row, mapping.kind.as_deref())),
        row_title(row, row_number, mapping),
    );

    let content = cell_text(row, mapping.content.as_deref());
    if !content.is_empty() {
        node.content = Some(content);
    }

    node.tags = normalize_tags(cell_text(row, mapping.tags.as_deref()).split(','));

    let link = cell_text(row, mapping.link.as_deref());
    if !link.is_empty() {
        node.external_links.push(ExternalLink::link(link));
    }
    node
}

fn row_title(row: &RawRow, row_number: usize, mapping: &FieldMap) -> String {
    let title = cell_text(row, Some(mapping.title.as_str()));
    if title.is_empty() {
        format!("Untitled {row_number}")
    } else {
        title
    }
}

/// Only `folder` survives; containers are reserved for the import wrapper.
fn parse_row_kind(value: &str) -> NodeKind {
    match value.to_lowercase().as_str() {
        "folder" => NodeKind::Folder,
        _ => NodeKind::Leaf,
    }
}

fn root_title_or_default(root_title: &str) -> &str {
    let trimmed = root_title.trim();
    if trimmed.is_empty() {
        DEFAULT_ROOT_TITLE
    } else {
        trimmed
    }
}

/// `"0"` (and `"-0"`, `"00"`) means "no parent", same as blank.
fn is_blank_reference(reference: &str) -> bool {
    reference.is_empty() || leading_integer(reference) == Some(0)
}

/// Numeric coercion first, then raw-string key lookup.
fn resolve_reference(reference: &str, row_count: usize) -> Option<usize> {
    let numeric = leading_integer(reference)
        .filter(|value| *value > 0)
        .and_then(|value| usize::try_from(value).ok());
    let row = numeric.or_else(|| reference.parse::<usize>().ok())?;
    (1..=row_count).contains(&row).then_some(row)
}

/// Integer prefix of `value` (optional sign, then digits), like `parseInt`.
fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Topmost ancestor of every row under the links accepted so far.
///
/// A row is still unlinked when its own link is examined, so it is the top
/// of its chain; linking it under `parent` closes a cycle exactly when
/// `parent`'s chain already ends at the row. Path halving keeps lookups
/// near-constant on long chains.
struct ChainRoots {
    up: Vec<usize>,
}

impl ChainRoots {
    fn new(row_count: usize) -> Self {
        Self {
            up: (0..=row_count).collect(),
        }
    }

    fn top_of(&mut self, mut row: usize) -> usize {
        while self.up[row] != row {
            self.up[row] = self.up[self.up[row]];
            row = self.up[row];
        }
        row
    }

    fn attach(&mut self, row: usize, parent: usize) {
        let top = self.top_of(parent);
        self.up[row] = top;
    }
}

/// Row numbers ordered so every child precedes its parent and siblings keep
/// row order.
fn post_order(
    row_count: usize,
    parent_of: &HashMap<usize, usize>,
    child_rows: &HashMap<usize, Vec<usize>>,
) -> Vec<usize> {
    let mut order = Vec::with_capacity(row_count);
    for top in (1..=row_count).filter(|row| !parent_of.contains_key(row)) {
        let mut stack = vec![(top, false)];
        while let Some((row, expanded)) = stack.pop() {
            if expanded {
                order.push(row);
                continue;
            }
            stack.push((row, true));
            if let Some(kids) = child_rows.get(&row) {
                stack.extend(kids.iter().rev().map(|kid| (*kid, false)));
            }
        }
    }
    order
}
