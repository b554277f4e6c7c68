//! Knowledge-tree node model.
//!
//! # Responsibility
//! - Define the universal tree entity shared by import, layout and search.
//! - Keep `children` / `parent_id` agreement at construction time.
//!
//! # Invariants
//! - `id` is stable for the node lifetime and unique within one tree.
//! - `title` is never blank.
//! - Every child's `parent_id` names the node that owns it.
//! - Tags are unique within one node; display order is preserved.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Stable identifier for one tree node.
pub type NodeId = Uuid;

/// Title used when a caller passes a blank title.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Structural category of a node.
///
/// Governs default behavior only; a `Leaf` may still carry children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Top-level organizational node (course-like container).
    #[serde(rename = "syllabus", alias = "container")]
    Container,
    /// Grouping node.
    #[serde(rename = "folder")]
    Folder,
    /// Document node carrying content.
    #[serde(rename = "file", alias = "leaf")]
    Leaf,
}

impl NodeKind {
    /// Wire name used by stored trees.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "syllabus",
            Self::Folder => "folder",
            Self::Leaf => "file",
        }
    }
}

/// Link from a node to an external resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ExternalLink {
    /// Plain hyperlink without label.
    pub fn link(url: impl Into<String>) -> Self {
        Self {
            kind: "link".to_string(),
            url: url.into(),
            label: None,
        }
    }
}

/// Canonical tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    /// Serialized as `type` to match stored tree naming.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// `None` means root-level node.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Ordered children. Order drives layout angle allocation.
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub external_links: Vec<ExternalLink>,
    /// Completion percentage, 0..=100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Display hint only.
    #[serde(default)]
    pub pinned: bool,
    /// Set only on the wrapper node created by an import batch.
    #[serde(default)]
    pub is_generated: bool,
}

impl Node {
    /// Creates a root-level node with a generated stable ID.
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, title)
    }

    /// Creates a root-level node with a caller-provided ID.
    ///
    /// Blank titles are replaced by [`DEFAULT_TITLE`].
    pub fn with_id(id: NodeId, kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id,
            title: normalize_title(title.into()),
            kind,
            parent_id: None,
            children: Vec::new(),
            content: None,
            tags: Vec::new(),
            external_links: Vec::new(),
            progress: None,
            pinned: false,
            is_generated: false,
        }
    }

    /// Appends `child` and points its `parent_id` at this node.
    pub fn add_child(&mut self, mut child: Node) {
        child.parent_id = Some(self.id);
        self.children.push(child);
    }

    /// Builder-style variant of [`Node::add_child`].
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Replaces tags with trimmed, non-empty, first-occurrence-unique values.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Depth-first pre-order walk over this node and all descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in this subtree, excluding `self`.
    pub fn descendant_count(&self) -> usize {
        self.walk().count() - 1
    }

    /// Mean progress over immediate children.
    ///
    /// Children without progress count as 0. Returns `None` for childless
    /// nodes. Not recursive.
    pub fn aggregate_progress(&self) -> Option<f64> {
        if self.children.is_empty() {
            return None;
        }
        let total: f64 = self
            .children
            .iter()
            .map(|child| child.progress.unwrap_or(0.0).clamp(0.0, 100.0))
            .sum();
        Some(total / self.children.len() as f64)
    }
}

// Derived drop glue recurses once per level; unlink children onto a heap
// stack instead so deep imports can be dropped.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Rebuilds a forest from a flat node array using `parent_id`.
///
/// Existing `children` on input nodes are discarded. Nodes whose parent is
/// absent, is themselves, or lies on a cycle become roots with `parent_id`
/// cleared. Child order and root order follow input order.
pub fn build_forest(nodes: Vec<Node>) -> Vec<Node> {
    let ids: HashSet<NodeId> = nodes.iter().map(|node| node.id).collect();
    let mut parent_of: HashMap<NodeId, NodeId> = nodes
        .iter()
        .filter_map(|node| {
            node.parent_id
                .filter(|parent| *parent != node.id && ids.contains(parent))
                .map(|parent| (node.id, parent))
        })
        .collect();

    // Cut every cycle by detaching the node that first revisits the chain.
    // Chains already proven acyclic are never walked again.
    let mut settled: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        let mut path = vec![node.id];
        let mut on_path: HashSet<NodeId> = HashSet::from([node.id]);
        let mut cursor = node.id;
        while !settled.contains(&cursor) {
            let Some(&parent) = parent_of.get(&cursor) else {
                break;
            };
            if !on_path.insert(parent) {
                parent_of.remove(&cursor);
                break;
            }
            path.push(parent);
            cursor = parent;
        }
        settled.extend(path);
    }

    let order: Vec<NodeId> = nodes.iter().map(|node| node.id).collect();
    let mut child_ids: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for id in &order {
        if let Some(parent) = parent_of.get(id) {
            child_ids.entry(*parent).or_default().push(*id);
        }
    }

    let mut pool: HashMap<NodeId, Node> = nodes
        .into_iter()
        .map(|mut node| {
            node.children.clear();
            node.parent_id = parent_of.get(&node.id).copied();
            (node.id, node)
        })
        .collect();

    order
        .iter()
        .filter(|id| !parent_of.contains_key(id))
        .filter_map(|id| assemble(*id, &mut pool, &child_ids))
        .collect()
}

// Post-order assembly with an explicit stack so deep imports cannot overflow.
fn assemble(
    root: NodeId,
    pool: &mut HashMap<NodeId, Node>,
    child_ids: &HashMap<NodeId, Vec<NodeId>>,
) -> Option<Node> {
    let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
    let mut done: HashMap<NodeId, Node> = HashMap::new();
    while let Some((id, expanded)) = stack.pop() {
        let kids = child_ids.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        if expanded {
            let mut node = pool.remove(&id)?;
            for kid in kids {
                if let Some(child) = done.remove(kid) {
                    node.children.push(child);
                }
            }
            done.insert(id, node);
        } else {
            stack.push((id, true));
            stack.extend(kids.iter().rev().map(|kid| (*kid, false)));
        }
    }
    done.remove(&root)
}

pub(crate) fn normalize_title(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Trims tags, drops empties and keeps the first occurrence of each value.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_string()) {
            unique.push(trimmed.to_string());
        }
    }
    unique
}
