use knowtree_core::{build_forest, ExternalLink, Node, NodeKind};
use uuid::Uuid;

#[test]
fn add_child_sets_parent_reference() {
    let mut folder = Node::new(NodeKind::Folder, "Folder");
    folder.add_child(Node::new(NodeKind::Leaf, "Doc"));

    assert!(folder.is_root());
    assert_eq!(folder.children[0].parent_id, Some(folder.id));
}

#[test]
fn aggregate_progress_uses_immediate_children_only() {
    let mut chapter = Node::new(NodeKind::Folder, "Chapter");
    let mut done = Node::new(NodeKind::Leaf, "Done");
    done.progress = Some(100.0);
    let mut half = Node::new(NodeKind::Folder, "Half");
    half.progress = Some(50.0);
    let mut deep = Node::new(NodeKind::Leaf, "Deep");
    deep.progress = Some(100.0);
    half.add_child(deep);
    chapter.add_child(done);
    chapter.add_child(half);
    chapter.add_child(Node::new(NodeKind::Leaf, "Untracked"));

    assert_eq!(chapter.aggregate_progress(), Some(50.0));
    assert_eq!(Node::new(NodeKind::Leaf, "empty").aggregate_progress(), None);
}

#[test]
fn aggregate_progress_clamps_out_of_range_values() {
    let mut parent = Node::new(NodeKind::Folder, "p");
    let mut over = Node::new(NodeKind::Leaf, "over");
    over.progress = Some(250.0);
    let mut under = Node::new(NodeKind::Leaf, "under");
    under.progress = Some(-40.0);
    parent.add_child(over);
    parent.add_child(under);
    assert_eq!(parent.aggregate_progress(), Some(50.0));
}

#[test]
fn build_forest_restores_hierarchy_in_input_order() {
    let root = Node::new(NodeKind::Container, "Course");
    let mut week1 = Node::new(NodeKind::Folder, "Week 1");
    week1.parent_id = Some(root.id);
    let mut week2 = Node::new(NodeKind::Folder, "Week 2");
    week2.parent_id = Some(root.id);
    let mut reading = Node::new(NodeKind::Leaf, "Reading");
    reading.parent_id = Some(week1.id);
    let mut stray = Node::new(NodeKind::Leaf, "Stray");
    stray.parent_id = Some(Uuid::new_v4());

    let forest = build_forest(vec![
        reading.clone(),
        week1.clone(),
        stray.clone(),
        root.clone(),
        week2.clone(),
    ]);

    let roots: Vec<_> = forest.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(roots, vec!["Stray", "Course"]);
    assert_eq!(forest[0].parent_id, None);

    let course = &forest[1];
    let weeks: Vec<_> = course.children.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(weeks, vec!["Week 1", "Week 2"]);
    assert_eq!(course.children[0].children[0].id, reading.id);
    assert_eq!(course.descendant_count(), 3);
}

#[test]
fn build_forest_promotes_self_parented_node() {
    let mut node = Node::new(NodeKind::Leaf, "loop");
    node.parent_id = Some(node.id);
    let forest = build_forest(vec![node]);
    assert_eq!(forest.len(), 1);
    assert!(forest[0].is_root());
}

#[test]
fn serialization_uses_stored_tree_field_names() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut node = Node::with_id(id, NodeKind::Container, "Course");
    node.external_links.push(ExternalLink::link("https://example.com"));
    node.pinned = true;

    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["type"], "syllabus");
    assert_eq!(json["parentId"], serde_json::Value::Null);
    assert_eq!(json["externalLinks"][0]["type"], "link");
    assert_eq!(json["pinned"], true);
    assert_eq!(json["isGenerated"], false);

    let decoded: Node = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, node);
}

#[test]
fn deserialization_accepts_minimal_nodes_and_kind_aliases() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Doc",
        "type": "leaf",
        "children": [
            {"id": "21111111-2222-4333-8444-555555555555", "title": "Sub", "type": "folder"}
        ]
    });
    let node: Node = serde_json::from_value(value).unwrap();
    assert_eq!(node.kind, NodeKind::Leaf);
    assert_eq!(node.children[0].kind, NodeKind::Folder);
    assert!(node.tags.is_empty());
    assert_eq!(node.progress, None);
}

#[test]
fn build_forest_handles_deep_chains() {
    let mut flat = vec![Node::new(NodeKind::Folder, "level 0")];
    for depth in 1..20_000 {
        let mut node = Node::new(NodeKind::Folder, format!("level {depth}"));
        node.parent_id = Some(flat[depth - 1].id);
        flat.push(node);
    }
    let top = flat[0].id;

    let forest = build_forest(flat);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, top);
    assert_eq!(forest[0].descendant_count(), 19_999);
    drop(forest);
}
