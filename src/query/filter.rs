//! Equality filtering over committed rows
//!
//! All criteria must match (AND semantics). Floating values match within
//! an absolute tolerance, complex values by modulus of the difference,
//! integer and boolean values exactly.

use crate::storage::{with_store, Element, Table, TableStore};
use crate::value::Scalar;

/// One column constraint, already resolved to a buffer column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub column: usize,
    pub expected: Scalar,
}

impl Criterion {
    pub fn new(column: usize, expected: impl Into<Scalar>) -> Self {
        Self {
            column,
            expected: expected.into(),
        }
    }
}

/// Evaluates criteria against the rows of a table
pub struct RowFilter;

impl RowFilter {
    /// Indices of rows in `0..len` matching every criterion, ascending.
    ///
    /// No criteria matches every row.
    pub fn matching_rows(
        table: &Table,
        len: usize,
        criteria: &[Criterion],
        tolerance: f64,
    ) -> Vec<usize> {
        let len = len.min(table.rows());
        with_store!(table, store => Self::scan(store, len, criteria, tolerance))
    }

    fn scan<T: Element>(
        store: &TableStore<T>,
        len: usize,
        criteria: &[Criterion],
        tolerance: f64,
    ) -> Vec<usize> {
        let mut targets = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            match Self::target::<T>(criterion.expected) {
                Some(target) => targets.push((criterion.column, target)),
                // a value the kind cannot hold matches nothing
                None => return Vec::new(),
            }
        }

        (0..len)
            .filter(|&row| {
                targets.iter().all(|&(col, target)| {
                    store
                        .get(row, col)
                        .is_some_and(|cell| cell.approx_eq(target, tolerance))
                })
            })
            .collect()
    }

    /// `expected` converted to the element type when the conversion is exact
    fn target<T: Element>(expected: Scalar) -> Option<T> {
        let target = T::from_scalar(expected);
        (target.to_scalar().as_complex() == expected.as_complex()).then_some(target)
    }
}
