//! Tests for the flattening projection and grand total

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

fn nested_specs() -> Vec<NodeSpec> {
    vec![
        spec(
            "electronics",
            "Electronics",
            0.0,
            vec![
                spec(
                    "phones",
                    "Phones",
                    0.0,
                    vec![
                        spec("android", "Android", 500.0, vec![]),
                        spec("ios", "iOS", 300.0, vec![]),
                    ],
                ),
                spec("laptops", "Laptops", 700.0, vec![]),
            ],
        ),
        spec("furniture", "Furniture", 1000.0, vec![]),
    ]
}

#[test]
fn given_nested_tree_when_flattening_then_preorder_with_depths() {
    // Arrange
    let tree = TreeBuilder::new().build(nested_specs()).unwrap();

    // Act
    let rows = tree.flatten();

    // Assert: parent immediately before its children
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["electronics", "phones", "android", "ios", "laptops", "furniture"]
    );
    let depths: Vec<usize> = rows.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 2, 1, 0]);
}

#[test]
fn given_nested_tree_when_flattening_then_leaf_flags_are_set() {
    // Arrange
    let tree = TreeBuilder::new().build(nested_specs()).unwrap();

    // Act
    let rows = tree.flatten();

    // Assert
    let leaves: Vec<bool> = rows.iter().map(|r| r.leaf).collect();
    assert_eq!(leaves, vec![false, false, true, true, true, true]);
}

#[test]
fn given_nested_tree_when_flattening_then_values_are_aggregated() {
    // Arrange
    let tree = TreeBuilder::new().build(nested_specs()).unwrap();

    // Act
    let rows = tree.flatten();

    // Assert
    let phones = rows.iter().find(|r| r.id == "phones").unwrap();
    assert_eq!(phones.value, 800.0);
    let electronics = rows.iter().find(|r| r.id == "electronics").unwrap();
    assert_eq!(electronics.value, 1500.0);
}

#[test]
fn given_forest_when_summing_then_grand_total_covers_roots_only() {
    // Arrange
    let tree = TreeBuilder::new().build(nested_specs()).unwrap();

    // Act & Assert: only depth-0 values are summed, no double counting
    assert_eq!(tree.grand_total(), 2500.0);
}

#[test]
fn given_tree_when_flattening_then_snapshot_is_unchanged() {
    // Arrange
    let tree = TreeBuilder::new().build(nested_specs()).unwrap();
    let before = tree.flatten();

    // Act: projection is a pure read
    let _ = tree.flatten();
    let _ = tree.grand_total();

    // Assert
    assert_eq!(tree.flatten(), before);
}
