//! # Layout Tests
//!
//! Geometry resolution through the host surface:
//!
//! 1. **Expression laws**: percent, `after`, `of`
//! 2. **Sources**: TOML documents, late references, templates from disk
//!
//! Run with: cargo test --package trellis_ui --test layout

use trellis_ui::{directory_loader, EngineConfig, NodeRecord, Rect, Scene};

fn resolved(scene: &Scene, id: &str) -> Rect {
    let handle = scene.node_by_id(id).unwrap_or_else(|| panic!("no node {id}"));
    scene.node(handle).unwrap().resolved()
}

// ============================================================================
// EXPRESSION LAWS
// ============================================================================

#[test]
fn percent_is_fraction_of_outer_extent() {
    for outer in [0.0_f32, 1.0, 333.0, 1920.0] {
        for percent in [0_u32, 1, 33, 50, 100] {
            let mut record = NodeRecord::new("n", "basic");
            record.width = format!("{percent}%");
            let mut scene = Scene::new(EngineConfig::default());
            scene.parse_records(&[record]).unwrap();
            scene.layout(outer, 10.0);

            let expected = percent as f32 / 100.0 * outer;
            assert!((resolved(&scene, "n").width - expected).abs() < 1e-3, "{percent}% of {outer}");
        }
    }
}

#[test]
fn after_and_of_chain_between_siblings() {
    let src = r#"[
        { "id": "a", "type": "basic", "x": "10", "width": "20", "height": "40" },
        { "id": "b", "type": "basic", "x": "after a", "height": "50% of a" },
        { "id": "c", "type": "basic", "x": "at b", "y": "after b", "width": "25% of a" }
    ]"#;
    let mut scene = Scene::from_json(src, EngineConfig::default()).unwrap();
    scene.layout(640.0, 480.0);

    assert_eq!(resolved(&scene, "b").x, 30.0);
    assert_eq!(resolved(&scene, "b").height, 20.0);
    assert_eq!(resolved(&scene, "b").width, 640.0);
    assert_eq!(resolved(&scene, "c"), Rect::new(30.0, 20.0, 5.0, 480.0));
}

#[test]
fn repeated_layout_is_stable() {
    let src = r#"[
        { "id": "bar", "type": "basic", "y": "90%", "height": "10%",
          "children": [
            { "id": "left", "type": "basic", "x": "4", "width": "50% of bar", "originY": "-50%" },
            { "id": "right", "type": "basic", "x": "after left", "width": "at left" }
          ] }
    ]"#;
    let mut scene = Scene::from_json(src, EngineConfig::default()).unwrap();
    scene.layout(800.0, 600.0);
    let first: Vec<Rect> = ["bar", "left", "right"].iter().map(|id| resolved(&scene, id)).collect();

    for _ in 0..3 {
        scene.layout(800.0, 600.0);
    }
    let again: Vec<Rect> = ["bar", "left", "right"].iter().map(|id| resolved(&scene, id)).collect();
    assert_eq!(first, again);
    assert_eq!(first[1].y, 540.0 - 30.0);
}

#[test]
fn draw_relayouts_on_resize() {
    let src = r#"[{ "id": "half", "type": "basic", "width": "50%" }]"#;
    let mut scene = Scene::from_json(src, EngineConfig::default()).unwrap();

    scene.draw(200.0, 100.0);
    assert_eq!(resolved(&scene, "half").width, 100.0);

    let frame = scene.draw(400.0, 100.0);
    assert_eq!(resolved(&scene, "half").width, 200.0);
    assert_eq!(frame.target(), Rect::new(0.0, 0.0, 400.0, 100.0));
}

// ============================================================================
// SOURCES
// ============================================================================

#[test]
fn toml_source_builds_the_same_tree() {
    let src = r##"
        [[nodes]]
        id = "sidebar"
        type = "basic"
        width = "25%"
        backgroundColor = "#1a1a1a"

        [[nodes.children]]
        id = "title"
        type = "basic"
        x = "8"
        y = "8"
        height = "24"
        text = "Inventory"

        [[nodes]]
        id = "content"
        type = "basic"
        x = "after sidebar"
        width = "75%"
    "##;
    let mut scene = Scene::from_toml(src, EngineConfig::default()).unwrap();
    scene.layout(1000.0, 500.0);

    assert_eq!(resolved(&scene, "sidebar").width, 250.0);
    assert_eq!(resolved(&scene, "title"), Rect::new(8.0, 8.0, 250.0, 24.0));
    assert_eq!(resolved(&scene, "content").x, 250.0);
    assert_eq!(scene.tree().len(), 3);
}

#[test]
fn malformed_toml_is_rejected_up_front() {
    let src = r#"
        [[nodes]]
        id = "bad"
        width = "50 of nothing"
    "#;
    assert!(Scene::from_toml(src, EngineConfig::default()).is_err());
}

#[test]
fn late_reference_recovers_on_later_layout() {
    let src = r#"[{ "id": "tail", "type": "basic", "x": "after head", "width": "10" }]"#;
    let mut scene = Scene::from_json(src, EngineConfig::default()).unwrap();
    scene.layout(300.0, 300.0);
    assert_eq!(resolved(&scene, "tail").x, 0.0);

    let mut head = NodeRecord::new("head", "basic");
    head.x = "40".to_string();
    head.width = "60".to_string();
    scene.add_node(None, &head).unwrap();

    // `head` comes later in declaration order, so the first pass reads it stale.
    scene.layout(300.0, 300.0);
    scene.layout(300.0, 300.0);
    assert_eq!(resolved(&scene, "tail").x, 100.0);
}

#[test]
fn templates_load_from_directory() {
    let dir = std::env::temp_dir().join(format!("trellis-templates-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("stat.toml"),
        r#"
            [[nodes]]
            id = "label"
            type = "basic"
            width = "40%"

            [[nodes]]
            id = "value"
            type = "basic"
            x = "after label"
            width = "at label"
        "#,
    )
    .unwrap();

    let src = r#"[
        { "id": "hp", "type": "template", "source": "stat", "y": "0", "width": "100", "height": "20" },
        { "id": "mp", "type": "template", "source": "stat", "y": "after hp", "width": "200", "height": "20" },
        { "id": "xp", "type": "template", "source": "missing", "y": "after mp", "height": "20" }
    ]"#;
    let mut scene = Scene::from_json(src, EngineConfig::default()).unwrap();
    scene.set_template_loader(directory_loader(&dir));
    scene.layout(500.0, 500.0);

    assert_eq!(resolved(&scene, "hp__value").x, 40.0);
    assert_eq!(resolved(&scene, "mp__value").x, 80.0);
    assert_eq!(resolved(&scene, "mp__value").y, 20.0);
    let xp = scene.node_by_id("xp").unwrap();
    assert!(scene.tree().children(xp).is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
