use layout_types::{ArgValue, DVec3, LayoutAssignment, RelationKind, SceneGraph};

#[test]
fn planner_scene_graph_parses() {
    let raw = r#"{
        "relations": [
            { "type": "Alignment", "involved_assets": ["house1", "house2"], "args": {"axis": "x"} },
            { "type": "Proximity", "involved_assets": ["lamp1", "house1"], "args": {"min_dist": 1.0} },
            { "type": "Facing", "involved_assets": ["lamp1", "house2"] }
        ]
    }"#;
    let graph: SceneGraph = serde_json::from_str(raw).expect("parse scene graph");

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.relations[0].kind, RelationKind::Alignment);
    assert_eq!(
        graph.relations[0].args.get("axis"),
        Some(&ArgValue::Text("x".to_string()))
    );
    assert_eq!(
        graph.relations[1].args.get("min_dist"),
        Some(&ArgValue::Number(1.0))
    );
    assert_eq!(graph.relations[2].skill_name(), "facing");
    assert!(graph.relations[2].args.is_empty());
    assert_eq!(
        graph.asset_names().into_iter().collect::<Vec<_>>(),
        vec!["house1", "house2", "lamp1"]
    );
}

#[test]
fn layout_assignment_uses_array_vectors() {
    let raw = r#"{
        "table": { "location": [1.0, 2.0, 0.0], "orientation": [0.0, 90.0, 0.0], "scale": [1.0, 1.0, 1.0] }
    }"#;
    let assignment: LayoutAssignment = serde_json::from_str(raw).expect("parse assignment");
    let table = assignment.get("table").expect("table");
    assert_eq!(table.location, DVec3::new(1.0, 2.0, 0.0));
    assert_eq!(table.orientation.y, 90.0);

    let out = serde_json::to_value(&assignment).expect("serialize");
    assert_eq!(out["table"]["location"], serde_json::json!([1.0, 2.0, 0.0]));
}

#[test]
fn missing_asset_is_reported() {
    let raw = r#"{ "relations": [ { "type": "proximity", "involved_assets": ["a", "ghost"] } ] }"#;
    let graph: SceneGraph = serde_json::from_str(raw).expect("parse");
    let mut assignment = LayoutAssignment::new();
    assignment.insert("a".to_string(), Default::default());
    assert_eq!(graph.first_missing_asset(&assignment), Some("ghost"));
}
