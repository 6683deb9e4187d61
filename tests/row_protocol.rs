//! Row Protocol Tests
//!
//! Staged writes, commits, the cursor and the column/buffer invariants,
//! exercised through the public handle only:
//! - Values written with `set` are staged until committed
//! - The committed length only shrinks through row removal
//! - Columns keep their data across insertions, renames and removals
//! - Search and sort only see committed rows

use datacube::columns::ColumnRef;
use datacube::config::CubeConfig;
use datacube::cube::{Cube, CubeError, InsertOptions, SetOptions};
use datacube::value::{Complex, DataKind, Scalar};

// =============================================================================
// Helper Functions
// =============================================================================

fn floats(values: &[f64]) -> Vec<Scalar> {
    values.iter().map(|v| Scalar::Float(*v)).collect()
}

/// Node with columns `a`, `b` and rows (1,2), (3,4) committed
fn ab_cube() -> Cube {
    let cube = Cube::new("ab");
    cube.set_with(SetOptions::committed(), [("a", 1.0), ("b", 2.0)])
        .unwrap();
    cube.set_with(SetOptions::committed(), [("a", 3.0), ("b", 4.0)])
        .unwrap();
    cube
}

// =============================================================================
// Staging and Commit
// =============================================================================

#[test]
fn test_staged_row_is_invisible_until_commit() {
    let cube = ab_cube();
    cube.set([("a", 5.0), ("b", 6.0)]).unwrap();

    assert_eq!(cube.len(), 2);
    assert_eq!(cube.read().table().len(), 2);
    assert_eq!(cube.read().search([("a", 5.0)], 1e-8), Vec::<usize>::new());

    assert_eq!(cube.commit().unwrap(), 2);
    assert_eq!(cube.len(), 3);
    assert_eq!(cube.cursor(), 3);
    assert_eq!(cube.read().search([("a", 5.0)], 1e-8), vec![2]);
}

#[test]
fn test_length_is_monotonic_under_commits() {
    let cube = ab_cube();
    cube.go_to(0).unwrap();
    cube.set([("a", 10.0)]).unwrap();
    cube.commit().unwrap();

    assert_eq!(cube.len(), 2);
    assert_eq!(cube.cursor(), 1);
    assert_eq!(cube.read().column("a").unwrap(), floats(&[10.0, 3.0]));
}

#[test]
fn test_rejected_commit_leaves_node_unchanged() {
    let cube = ab_cube();
    let err = cube.commit_with(Some(10_000), true).unwrap_err();

    assert!(matches!(err, CubeError::OutOfRangeIndex { .. }));
    assert!(err.is_rejection());
    assert_eq!(cube.len(), 2);
    assert_eq!(cube.cursor(), 2);
}

#[test]
fn test_add_row_commits_zeroed_append_slot() {
    let cube = ab_cube();
    assert_eq!(cube.add_row().unwrap(), 2);
    assert_eq!(cube.len(), 3);
    assert_eq!(cube.cursor(), 2);
    assert_eq!(cube.read().row_at(2).unwrap(), floats(&[0.0, 0.0]));
}

#[test]
fn test_go_to_end_moves_to_append_slot() {
    let cube = ab_cube();
    cube.go_to(0).unwrap();
    cube.go_to_end().unwrap();
    assert_eq!(cube.cursor(), 2);
}

// =============================================================================
// Insert and Remove
// =============================================================================

#[test]
fn test_insert_after_last_row() {
    let cube = ab_cube();
    let options = InsertOptions {
        at: Some(-1),
        before: false,
        commit: true,
        ..InsertOptions::default()
    };
    let at = cube.insert_with(options, [("a", 7.0), ("b", 8.0)]).unwrap();

    assert_eq!(at, 2);
    assert_eq!(cube.len(), 3);
    assert_eq!(cube.read().row_at(2).unwrap(), floats(&[7.0, 8.0]));
}

#[test]
fn test_insert_several_rows_at_front() {
    let cube = ab_cube();
    cube.insert_rows(Some(0), 2, [("a", 0.5)]).unwrap();

    assert_eq!(cube.len(), 4);
    assert_eq!(cube.read().column("a").unwrap(), floats(&[0.5, 0.5, 1.0, 3.0]));
    assert_eq!(cube.read().column("b").unwrap(), floats(&[0.0, 0.0, 2.0, 4.0]));
}

#[test]
fn test_remove_row_shifts_following_rows() {
    let cube = ab_cube();
    cube.remove_row(0).unwrap();

    assert_eq!(cube.len(), 1);
    assert_eq!(cube.cursor(), 1);
    assert_eq!(cube.read().table(), vec![floats(&[3.0, 4.0])]);
    assert!(cube.remove_row(1).unwrap_err().is_rejection());
}

// =============================================================================
// Column Invariants
// =============================================================================

#[test]
fn test_remove_then_readd_column_is_zero_filled() {
    let cube = ab_cube();
    cube.remove_columns(["a"]).unwrap();
    assert_eq!(cube.read().names(), vec!["b"]);
    assert_eq!(cube.read().column("b").unwrap(), floats(&[2.0, 4.0]));

    cube.add_column("a").unwrap();
    assert_eq!(cube.read().names(), vec!["b", "a"]);
    assert_eq!(cube.read().column("a").unwrap(), floats(&[0.0, 0.0]));
}

#[test]
fn test_field_map_tracks_field_list() {
    let cube = ab_cube();
    cube.insert_column(Some("first"), Some(0)).unwrap();
    cube.rename_column("b", Some("bee")).unwrap();
    cube.remove_column(ColumnRef::from("a")).unwrap();

    let node = cube.read();
    assert_eq!(node.names(), vec!["first", "bee"]);
    for (i, name) in node.column_names().iter().enumerate() {
        assert_eq!(node.field_map().get(name), Some(&i));
    }
    assert_eq!(node.field_map().len(), node.column_count());
    assert_eq!(node.column("bee").unwrap(), floats(&[2.0, 4.0]));
}

#[test]
fn test_auto_names_exhaust() {
    let config = CubeConfig {
        max_auto_names: 2,
        ..CubeConfig::default()
    };
    let cube = Cube::builder("auto").config(config).build();
    cube.insert_column(None, None).unwrap();
    cube.insert_column(None, None).unwrap();

    assert!(matches!(
        cube.insert_column(None, None),
        Err(CubeError::ColumnNameExhausted(2))
    ));
    assert_eq!(cube.read().column_count(), 2);
}

#[test]
fn test_values_follow_node_kind() {
    let cube = Cube::builder("ints").kind(DataKind::Int).build();
    cube.set_with(SetOptions::committed(), [("n", 2.7)]).unwrap();
    assert_eq!(cube.read().value("n", 0).unwrap(), Scalar::Int(2));

    let waves = Cube::builder("waves").kind(DataKind::Complex).build();
    waves
        .set_with(
            SetOptions::committed(),
            [("z", Scalar::Complex(Complex::new(1.0, -1.0)))],
        )
        .unwrap();
    assert_eq!(
        waves.read().search([("z", Complex::new(1.0, -1.0 + 1e-10))], 1e-8),
        vec![0]
    );
}

// =============================================================================
// Search and Sort
// =============================================================================

#[test]
fn test_search_then_sort_descending() {
    let cube = ab_cube();
    assert_eq!(cube.read().search([("a", 3.0)], 1e-8), vec![1]);

    cube.sort_by("a", true).unwrap();
    assert_eq!(
        cube.read().table(),
        vec![floats(&[3.0, 4.0]), floats(&[1.0, 2.0])]
    );
}

#[test]
fn test_sort_leaves_staged_rows_alone() {
    let cube = ab_cube();
    cube.set([("a", -1.0), ("b", -1.0)]).unwrap();
    cube.sort_by("a", false).unwrap();

    assert_eq!(cube.read().column("a").unwrap(), floats(&[1.0, 3.0]));
    assert_eq!(cube.read().value("a", 2).unwrap(), Scalar::Float(-1.0));
}

#[test]
fn test_search_with_tolerance() {
    let cube = ab_cube();
    assert_eq!(cube.read().search([("a", 3.05)], 0.1), vec![1]);
    assert!(cube.read().search([("a", 3.05)], 0.01).is_empty());
    assert_eq!(cube.read().search(Vec::<(&str, f64)>::new(), 0.0), vec![0, 1]);
}
