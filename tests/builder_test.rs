//! Tests for TreeBuilder

use rsalloc::domain::{NodeSpec, TreeBuilder};

fn spec(id: &str, label: &str, value: f64, children: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec {
        id: id.to_string(),
        label: label.to_string(),
        value,
        original_value: None,
        children,
    }
}

fn catalog_specs() -> Vec<NodeSpec> {
    vec![
        spec(
            "electronics",
            "Electronics",
            1500.0,
            vec![
                spec("phones", "Phones", 800.0, vec![]),
                spec("laptops", "Laptops", 700.0, vec![]),
            ],
        ),
        spec(
            "furniture",
            "Furniture",
            1000.0,
            vec![
                spec("tables", "Tables", 300.0, vec![]),
                spec("chairs", "Chairs", 700.0, vec![]),
            ],
        ),
    ]
}

#[test]
fn given_catalog_specs_when_building_then_tree_is_consistent() {
    // Arrange
    let specs = catalog_specs();

    // Act
    let tree = TreeBuilder::new().build(specs).unwrap();

    // Assert
    assert_eq!(tree.node_count(), 6);
    assert_eq!(tree.grand_total(), 2500.0);
    for (_, node) in tree.iter() {
        assert_eq!(node.data.variance, 0.0, "initial variance for {}", node.data.id);
    }
}

#[test]
fn given_declared_subtotal_drift_when_building_then_aggregation_wins() {
    // Arrange: parent declares 999 but children sum to 1000
    let specs = vec![spec(
        "parent",
        "Parent",
        999.0,
        vec![
            spec("a", "A", 400.0, vec![]),
            spec("b", "B", 600.0, vec![]),
        ],
    )];

    // Act
    let tree = TreeBuilder::new().build(specs).unwrap();

    // Assert: value overwritten, baseline kept, variance shows the drift
    let parent = tree.find("parent").unwrap();
    let node = tree.get_node(parent).unwrap();
    assert_eq!(node.data.value, 1000.0);
    assert_eq!(node.data.original_value, 999.0);
    assert!(node.data.variance > 0.0);
}

#[test]
fn given_explicit_baseline_when_building_then_baseline_is_kept() {
    // Arrange
    let mut leaf = spec("leaf", "Leaf", 120.0, vec![]);
    leaf.original_value = Some(100.0);

    // Act
    let tree = TreeBuilder::new().build(vec![leaf]).unwrap();

    // Assert
    let node = tree.get_node(tree.find("leaf").unwrap()).unwrap();
    assert_eq!(node.data.original_value, 100.0);
    assert!((node.data.variance - 20.0).abs() < 1e-9);
}

#[test]
fn given_duplicate_ids_when_building_then_errors() {
    // Arrange: duplicate at different depths
    let specs = vec![
        spec("root", "Root", 10.0, vec![spec("dup", "Dup", 10.0, vec![])]),
        spec("dup", "Dup Again", 5.0, vec![]),
    ];

    // Act
    let result = TreeBuilder::new().build(specs);

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_non_finite_spec_value_when_building_then_errors() {
    // Arrange
    let specs = vec![spec("bad", "Bad", f64::NAN, vec![])];

    // Act
    let result = TreeBuilder::new().build(specs);

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_empty_specs_when_building_then_empty_forest() {
    // Act
    let tree = TreeBuilder::new().build(vec![]).unwrap();

    // Assert
    assert!(tree.is_empty());
    assert_eq!(tree.grand_total(), 0.0);
    assert!(tree.flatten().is_empty());
}

#[test]
fn given_sibling_specs_when_building_then_child_order_is_preserved() {
    // Arrange
    let specs = vec![spec(
        "root",
        "Root",
        0.0,
        vec![
            spec("first", "First", 1.0, vec![]),
            spec("second", "Second", 2.0, vec![]),
            spec("third", "Third", 3.0, vec![]),
        ],
    )];

    // Act
    let tree = TreeBuilder::new().build(specs).unwrap();

    // Assert
    let ids: Vec<String> = tree.flatten().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["root", "first", "second", "third"]);
}
