//! Hierarchy Tests
//!
//! Tree invariants for attached nodes:
//! - A node appears at most once among a parent's children
//! - Attaching never creates a cycle
//! - The parent edge owns the child; the back-reference is weak
//! - Children are anchored to a parent row through the `row` attribute

use datacube::cube::{Cube, CubeError, SetOptions, ROW_ATTRIBUTE};
use datacube::value::{AttrValue, Attributes, Scalar};

// =============================================================================
// Helper Functions
// =============================================================================

fn attrs(pairs: &[(&str, AttrValue)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn sweep_with_rows(values: &[f64]) -> Cube {
    let cube = Cube::new("sweep");
    for v in values {
        cube.set_with(SetOptions::committed(), [("x", *v)]).unwrap();
    }
    cube
}

// =============================================================================
// Attach Rules
// =============================================================================

#[test]
fn test_row_defaults_to_parent_cursor() {
    let parent = sweep_with_rows(&[1.0, 2.0, 3.0]);
    parent.go_to(2).unwrap();
    let child = Cube::new("trace");
    parent.add_child(&child, Attributes::new()).unwrap();

    let attributes = parent.read().attributes_of(&child).unwrap();
    assert_eq!(attributes[ROW_ATTRIBUTE].as_row(), Some(2));
    assert_eq!(parent.read().children_at(2), vec![child.clone()]);
}

#[test]
fn test_explicit_row_is_kept() {
    let parent = sweep_with_rows(&[1.0, 2.0]);
    let child = Cube::new("trace");
    parent
        .add_child(&child, attrs(&[("row", AttrValue::Int(0))]))
        .unwrap();
    assert_eq!(parent.read().child_items()[0].row(), Some(0));
}

#[test]
fn test_self_and_duplicate_attach_rejected() {
    let parent = Cube::new("parent");
    let child = Cube::new("child");
    parent.add_child(&child, Attributes::new()).unwrap();

    assert!(matches!(
        parent.add_child(&parent, Attributes::new()),
        Err(CubeError::InvalidHierarchy(_))
    ));
    assert!(matches!(
        parent.add_child(&child, Attributes::new()),
        Err(CubeError::InvalidHierarchy(_))
    ));
    assert_eq!(parent.read().child_count(), 1);
}

#[test]
fn test_ancestor_attach_rejected() {
    let root = Cube::new("root");
    let middle = Cube::new("middle");
    let leaf = Cube::new("leaf");
    root.add_child(&middle, Attributes::new()).unwrap();
    middle.add_child(&leaf, Attributes::new()).unwrap();

    let err = leaf.add_child(&root, Attributes::new()).unwrap_err();
    assert!(err.is_rejection());
    assert!(leaf.read().children().is_empty());
    assert!(root.read().parent().is_none());
    assert!(leaf.has_ancestor(&root));
}

#[test]
fn test_reattach_moves_child() {
    let first = Cube::new("first");
    let second = Cube::new("second");
    let child = Cube::new("child");
    first.add_child(&child, Attributes::new()).unwrap();
    second.add_child(&child, Attributes::new()).unwrap();

    assert!(!first.read().has_child(&child));
    assert!(second.read().has_child(&child));
    assert_eq!(child.read().parent(), Some(second.clone()));
}

// =============================================================================
// Ownership
// =============================================================================

#[test]
fn test_parent_reference_is_weak() {
    let child = Cube::new("child");
    {
        let parent = Cube::new("parent");
        parent.add_child(&child, Attributes::new()).unwrap();
        assert!(child.read().parent().is_some());
    }
    assert!(child.read().parent().is_none());
}

#[test]
fn test_remove_subtree_detaches_descendants() {
    let root = Cube::new("root");
    let middle = Cube::new("middle");
    let leaf = Cube::new("leaf");
    root.add_child(&middle, Attributes::new()).unwrap();
    middle.add_child(&leaf, Attributes::new()).unwrap();

    assert!(root.remove_child(&middle, true).unwrap());
    assert!(root.read().children().is_empty());
    assert!(middle.read().children().is_empty());
    assert!(middle.read().parent().is_none());
    assert!(leaf.read().parent().is_none());
    assert!(!root.remove_child(&middle, false).unwrap());
}

#[test]
fn test_clear_keeps_identity_and_drops_children() {
    let parent = sweep_with_rows(&[1.0]);
    let child = Cube::new("child");
    parent.add_child(&child, Attributes::new()).unwrap();
    let id = parent.id();

    parent.clear().unwrap();
    assert_eq!(parent.id(), id);
    assert_eq!(parent.name(), "sweep");
    assert!(parent.is_empty());
    assert_eq!(parent.read().column_count(), 0);
    assert!(child.read().parent().is_none());
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_children_filtered_by_attributes() {
    let parent = Cube::new("parent");
    let hot = Cube::new("hot");
    let cold = Cube::new("cold");
    parent
        .add_child(&hot, attrs(&[("temp", AttrValue::from(300.0))]))
        .unwrap();
    parent
        .add_child(&cold, attrs(&[("temp", AttrValue::from(4.0)), ("field", AttrValue::from(1.5))]))
        .unwrap();

    let filter = attrs(&[("temp", AttrValue::from(4.0))]);
    assert_eq!(parent.read().children_where(&filter), vec![cold.clone()]);
    assert_eq!(
        parent.read().child_attribute_keys(true),
        vec!["row".to_string(), "temp".to_string()]
    );
    assert_eq!(
        parent.read().child_attribute_keys(false),
        vec!["field".to_string(), "row".to_string(), "temp".to_string()]
    );

    parent
        .set_child_attributes(&hot, attrs(&[("field", AttrValue::from(0.5))]))
        .unwrap();
    assert_eq!(
        parent.read().attributes_of(&hot).unwrap()["field"],
        AttrValue::Float(0.5)
    );
    assert!(matches!(
        parent.set_child_attributes(&Cube::new("stranger"), Attributes::new()),
        Err(CubeError::ChildNotFound(_))
    ));
}

// =============================================================================
// Traversal
// =============================================================================

#[test]
fn test_levels_and_family() {
    let root = Cube::new("root");
    let a = Cube::new("a");
    let b = Cube::new("b");
    let a1 = Cube::new("a1");
    let b1 = Cube::new("b1");
    root.add_child(&a, Attributes::new()).unwrap();
    root.add_child(&b, Attributes::new()).unwrap();
    a.add_child(&a1, Attributes::new()).unwrap();
    b.add_child(&b1, Attributes::new()).unwrap();

    assert_eq!(root.read().common_depth(), 2);
    assert_eq!(root.cubes_at_level(2, true), vec![a1.clone(), b1.clone()]);
    let names: Vec<String> = root.family_members().iter().map(Cube::name).collect();
    assert_eq!(names, vec!["root", "a", "a1", "b", "b1"]);
}

#[test]
fn test_flatten_joins_anchor_rows() {
    let parent = sweep_with_rows(&[10.0, 20.0]);
    let first = Cube::new("first");
    first.set_with(SetOptions::committed(), [("y", 1.0)]).unwrap();
    let second = Cube::new("second");
    second.set_with(SetOptions::committed(), [("y", 2.0)]).unwrap();
    second.set_with(SetOptions::committed(), [("y", 3.0)]).unwrap();

    parent
        .add_child(&first, attrs(&[("row", AttrValue::Int(0))]))
        .unwrap();
    parent
        .add_child(&second, attrs(&[("row", AttrValue::Int(1))]))
        .unwrap();

    let flat = parent.flatten().unwrap();
    let node = flat.read();
    assert_eq!(node.names(), vec!["row", "x", "y"]);
    assert_eq!(node.len(), 3);
    assert_eq!(
        node.column("x").unwrap(),
        vec![Scalar::Float(10.0), Scalar::Float(20.0), Scalar::Float(20.0)]
    );
    assert_eq!(
        node.column("row").unwrap(),
        vec![Scalar::Float(0.0), Scalar::Float(1.0), Scalar::Float(1.0)]
    );
}
