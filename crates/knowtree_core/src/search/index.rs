//! In-memory fuzzy index over a flattened tree.
//!
//! # Responsibility
//! - Build a searchable snapshot of title/content/tags for every node.
//! - Rank approximate matches best-first.
//!
//! # Invariants
//! - Blank queries return no hits.
//! - Hits are shallow copies; nothing references the source tree.
//! - One hit per node id; for repeated ids the last-seen copy wins.
//! - Ordering is by score, then exact field equality, then field (title,
//!   tag, content), then traversal order.

use crate::model::node::{Node, NodeId};
use crate::search::flatten::flatten;
use crate::search::fuzzy::{fold, score, Tolerance};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static HTML_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(nbsp|amp|lt|gt|quot|#39);").expect("valid entity regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Search tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Highest accepted normalized score, 0.0..=1.0.
    pub threshold: f64,
    /// Start offset, in characters, that costs one full score unit.
    pub distance: usize,
    /// Maximum hits to return; `None` means unlimited.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            distance: 100,
            limit: None,
        }
    }
}

/// Field that produced a hit's best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Title,
    Content,
    Tag,
}

impl MatchField {
    fn rank(self) -> u8 {
        match self {
            Self::Title => 0,
            Self::Tag => 1,
            Self::Content => 2,
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Shallow copy of the matched node.
    pub node: Node,
    /// 0.0 is a perfect match.
    pub score: f64,
    pub field: MatchField,
}

struct Entry {
    node: Node,
    title: Vec<char>,
    content: Vec<char>,
    tags: Vec<Vec<char>>,
}

/// Flattened, pre-folded snapshot of a forest.
pub struct SearchIndex {
    entries: Vec<Entry>,
    options: SearchOptions,
}

impl SearchIndex {
    /// Flattens `forest` and folds every searchable field.
    ///
    /// Fields are trimmed first, like queries, since deserialized nodes may
    /// carry padding that constructors would have removed.
    pub fn build(forest: &[Node], options: SearchOptions) -> Self {
        let flat = flatten(forest);
        let mut last_seen: HashMap<NodeId, usize> = HashMap::with_capacity(flat.len());
        for (position, node) in flat.iter().enumerate() {
            last_seen.insert(node.id, position);
        }

        let entries: Vec<Entry> = flat
            .into_iter()
            .enumerate()
            .filter(|(position, node)| last_seen.get(&node.id) == Some(position))
            .map(|(_, node)| Entry {
                title: fold(node.title.trim()),
                content: node
                    .content
                    .as_deref()
                    .map(|content| fold(&strip_html(content)))
                    .unwrap_or_default(),
                tags: node.tags.iter().map(|tag| fold(tag.trim())).collect(),
                node,
            })
            .collect();

        debug!(
            "event=search_index_build module=search status=ok entries={}",
            entries.len()
        );
        Self { entries, options }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattened nodes in traversal order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|entry| &entry.node)
    }

    /// Ranks entries against `query`, best first.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let pattern = fold(trimmed);
        let tolerance = Tolerance {
            threshold: self.options.threshold,
            distance: self.options.distance,
        };

        let mut ranked: Vec<(usize, bool, f64, MatchField)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                best_field(entry, &pattern, tolerance)
                    .map(|(score, field, exact)| (position, exact, score, field))
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.3.rank().cmp(&b.3.rank()))
                .then_with(|| a.0.cmp(&b.0))
        });
        if let Some(limit) = self.options.limit {
            ranked.truncate(limit);
        }

        debug!(
            "event=search_query module=search status=ok query_chars={} hits={}",
            pattern.len(),
            ranked.len()
        );
        ranked
            .into_iter()
            .map(|(position, _, score, field)| SearchHit {
                node: self.entries[position].node.clone(),
                score,
                field,
            })
            .collect()
    }
}

/// Builds a one-shot index over `forest` and returns matching nodes.
pub fn search_tree(forest: &[Node], query: &str) -> Vec<Node> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    SearchIndex::build(forest, SearchOptions::default())
        .search(query)
        .into_iter()
        .map(|hit| hit.node)
        .collect()
}

/// Lowest-scoring field of `entry`, with whether that field equals the query.
fn best_field(
    entry: &Entry,
    pattern: &[char],
    tolerance: Tolerance,
) -> Option<(f64, MatchField, bool)> {
    let fields = std::iter::once((MatchField::Title, &entry.title))
        .chain(entry.tags.iter().map(|tag| (MatchField::Tag, tag)))
        .chain(std::iter::once((MatchField::Content, &entry.content)));

    let mut best: Option<(f64, MatchField, bool)> = None;
    for (field, text) in fields {
        let Some(value) = score(pattern, text, tolerance) else {
            continue;
        };
        let exact = text.as_slice() == pattern;
        let better = match best {
            None => true,
            Some((current, _, current_exact)) => {
                value < current || (value == current && exact && !current_exact)
            }
        };
        if better {
            best = Some((value, field, exact));
        }
    }
    best
}

/// Removes markup so tags and entities never match queries.
pub fn strip_html(content: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(content, " ");
    let without_entities = HTML_ENTITY_RE.replace_all(&without_tags, " ");
    WHITESPACE_RE
        .replace_all(&without_entities, " ")
        .trim()
        .to_string()
}
