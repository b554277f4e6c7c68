use knowtree_core::layout::grid::cell_of;
use knowtree_core::{
    layout_forest, reconcile, FieldMap, Layout, LayoutConfig, LayoutSession, Node, NodeKind, Point,
};
use serde_json::json;
use std::collections::HashSet;
use std::f64::consts::TAU;

const EPS: f64 = 1e-9;

fn balanced_tree() -> Node {
    let mut root = Node::new(NodeKind::Container, "root");
    for branch in 0..2 {
        let mut child = Node::new(NodeKind::Folder, format!("child {branch}"));
        for leaf in 0..2 {
            child.add_child(Node::new(NodeKind::Leaf, format!("leaf {branch}.{leaf}")));
        }
        root.add_child(child);
    }
    root
}

fn uneven_forest() -> Vec<Node> {
    // One wide subtree next to a chain and a lone node.
    let mut wide = Node::new(NodeKind::Folder, "wide");
    for index in 0..40 {
        let mut child = Node::new(NodeKind::Leaf, format!("w{index}"));
        if index % 3 == 0 {
            child.add_child(Node::new(NodeKind::Leaf, format!("w{index}-deep")));
        }
        wide.add_child(child);
    }
    let mut chain = Node::new(NodeKind::Folder, "chain");
    let mut cursor = Node::new(NodeKind::Leaf, "c5");
    for depth in (0..5).rev() {
        cursor = Node::new(NodeKind::Leaf, format!("c{depth}")).with_child(cursor);
    }
    chain.add_child(cursor);
    vec![wide, chain, Node::new(NodeKind::Leaf, "lone")]
}

fn assert_collision_free(layout: &Layout) {
    let cells: HashSet<_> = layout.positions.values().map(|p| cell_of(*p)).collect();
    assert_eq!(cells.len(), layout.positions.len());
}

#[test]
fn balanced_tree_layout_is_deterministic() {
    let tree = balanced_tree();
    let config = LayoutConfig::default();

    let first = layout_forest(std::slice::from_ref(&tree), &config);
    let second = layout_forest(std::slice::from_ref(&tree), &config);

    assert_eq!(first.positions.len(), 7);
    assert_eq!(first, second);
    let first_json = serde_json::to_string(&first.positions).unwrap();
    let second_json = serde_json::to_string(&second.positions).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn balanced_tree_points_follow_depth_and_window_midpoints() {
    let tree = balanced_tree();
    let config = LayoutConfig::default();
    let layout = layout_forest(std::slice::from_ref(&tree), &config);

    let root = layout.position(tree.id).unwrap();
    assert!(root.x.abs() < EPS && root.y.abs() < EPS);

    // Children own [0, π) and [π, 2π); midpoints π/2 and 3π/2.
    let first = layout.position(tree.children[0].id).unwrap();
    assert!(first.x.abs() < 1e-6);
    assert!((first.y - config.radius_step).abs() < 1e-6);
    let second = layout.position(tree.children[1].id).unwrap();
    assert!((second.y + config.radius_step).abs() < 1e-6);

    // First grandchild window [0, π/2) -> midpoint π/4 at depth 2.
    let grandchild = layout.position(tree.children[0].children[0].id).unwrap();
    let expected = 2.0 * config.radius_step * (TAU / 8.0).cos();
    assert!((grandchild.x - expected).abs() < 1e-6);
    assert!((grandchild.y - expected).abs() < 1e-6);
    assert_eq!(layout.displaced, 0);
}

#[test]
fn child_windows_partition_parent_window() {
    let forest = uneven_forest();
    let layout = layout_forest(&forest, &LayoutConfig::default());

    let root_total: f64 = forest
        .iter()
        .map(|root| layout.windows[&root.id].width())
        .sum();
    assert!((root_total - TAU).abs() < EPS);

    for root in &forest {
        for node in root.walk().filter(|node| !node.children.is_empty()) {
            let parent = layout.windows[&node.id];
            let widths: f64 = node
                .children
                .iter()
                .map(|child| layout.windows[&child.id].width())
                .sum();
            assert!((widths - parent.width()).abs() < EPS);
            assert_eq!(layout.windows[&node.children[0].id].start, parent.start);
            assert_eq!(
                layout.windows[&node.children.last().unwrap().id].end,
                parent.end
            );
        }
    }
}

#[test]
fn uneven_forest_is_collision_free() {
    let forest = uneven_forest();
    let layout = layout_forest(&forest, &LayoutConfig::default());
    let expected: usize = forest.iter().map(|root| root.walk().count()).sum();

    assert_eq!(layout.positions.len(), expected);
    assert_collision_free(&layout);
    // All three roots start at the origin; two of them must move.
    assert!(layout.displaced >= 2);
}

#[test]
fn tiny_radius_forces_spiral_and_stays_collision_free() {
    let forest = uneven_forest();
    let config = LayoutConfig {
        radius_step: 0.5,
        ..LayoutConfig::default()
    };
    let layout = layout_forest(&forest, &config);
    assert_collision_free(&layout);
    assert!(layout.displaced > 10);
}

#[test]
fn edges_cover_every_parent_child_pair_once() {
    let forest = uneven_forest();
    let layout = layout_forest(&forest, &LayoutConfig::default());

    let expected: HashSet<_> = forest
        .iter()
        .flat_map(|root| root.walk())
        .flat_map(|node| node.children.iter().map(move |child| (node.id, child.id)))
        .collect();
    let actual: HashSet<_> = layout.edges.iter().map(|edge| (edge.from, edge.to)).collect();

    assert_eq!(layout.edges.len(), expected.len());
    assert_eq!(actual, expected);
}

#[test]
fn origin_offsets_every_point() {
    let tree = balanced_tree();
    let base = layout_forest(std::slice::from_ref(&tree), &LayoutConfig::default());
    let shifted = layout_forest(
        std::slice::from_ref(&tree),
        &LayoutConfig {
            origin: Point { x: 500.0, y: 300.0 },
            ..LayoutConfig::default()
        },
    );
    for (id, point) in &base.positions {
        let moved = shifted.positions[id];
        assert!((moved.x - point.x - 500.0).abs() < 1e-6);
        assert!((moved.y - point.y - 300.0).abs() < 1e-6);
    }
}

#[test]
fn separate_sessions_do_not_share_occupancy() {
    let lone = Node::new(NodeKind::Leaf, "lone");
    let first = layout_forest(std::slice::from_ref(&lone), &LayoutConfig::default());
    let second = layout_forest(std::slice::from_ref(&lone), &LayoutConfig::default());
    assert_eq!(first.position(lone.id), second.position(lone.id));
    assert_eq!(second.displaced, 0);
}

#[test]
fn shared_session_keeps_forests_apart() {
    let left = Node::new(NodeKind::Leaf, "left");
    let right = Node::new(NodeKind::Leaf, "right");
    let mut session = LayoutSession::new(LayoutConfig::default());
    session.place_forest(std::slice::from_ref(&left));
    session.place_forest(std::slice::from_ref(&right));
    let layout = session.finish();

    assert_eq!(layout.displaced, 1);
    assert_ne!(
        cell_of(layout.position(left.id).unwrap()),
        cell_of(layout.position(right.id).unwrap())
    );
}

#[test]
fn imported_tree_lays_out_without_collisions() {
    let rows: Vec<_> = (1..=60)
        .map(|row| {
            let parent = if row == 1 { String::new() } else { (row / 2).to_string() };
            json!({"title": format!("row {row}"), "parent": parent})
                .as_object()
                .unwrap()
                .clone()
        })
        .collect();
    let mapping = FieldMap {
        parent: Some("parent".to_string()),
        ..FieldMap::titled("title")
    };
    let root = reconcile(&rows, &mapping, "Import");
    let layout = layout_forest(std::slice::from_ref(&root), &LayoutConfig::default());

    assert_eq!(layout.positions.len(), 61);
    assert_eq!(layout.edges.len(), 60);
    assert_collision_free(&layout);
}
