//! Tree flattening for search.

use crate::model::node::Node;

/// Flattens `forest` depth-first (pre-order) into shallow copies.
///
/// Every emitted node has empty `children`; descendants are emitted as their
/// own entries. Uses an explicit stack, so depth is not bounded by the call
/// stack.
pub fn flatten(forest: &[Node]) -> Vec<Node> {
    let mut flat = Vec::new();
    let mut stack: Vec<&Node> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        flat.push(shallow_copy(node));
        stack.extend(node.children.iter().rev());
    }
    flat
}

/// Clone of `node` without its subtree.
pub fn shallow_copy(node: &Node) -> Node {
    Node {
        id: node.id,
        title: node.title.clone(),
        kind: node.kind,
        parent_id: node.parent_id,
        children: Vec::new(),
        content: node.content.clone(),
        tags: node.tags.clone(),
        external_links: node.external_links.clone(),
        progress: node.progress,
        pinned: node.pinned,
        is_generated: node.is_generated,
    }
}
