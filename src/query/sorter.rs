//! Row ordering by one column
//!
//! Sort is stable: rows with equal keys keep their relative order in both
//! directions.

use crate::storage::{with_store, Element, Table, TableStore};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Computes row permutations
pub struct RowSorter;

impl RowSorter {
    /// Order of rows `0..len` sorted by `column`: position `i` holds the
    /// old index of the row that belongs at `i`.
    pub fn order(table: &Table, column: usize, len: usize, direction: SortDirection) -> Vec<usize> {
        let len = len.min(table.rows());
        with_store!(table, store => Self::order_typed(store, column, len, direction))
    }

    /// Sorts rows `0..len` of `table` in place by `column`
    pub fn sort(table: &mut Table, column: usize, len: usize, direction: SortDirection) {
        let order = Self::order(table, column, len, direction);
        table.permute_rows(&order);
    }

    fn order_typed<T: Element>(
        store: &TableStore<T>,
        column: usize,
        len: usize,
        direction: SortDirection,
    ) -> Vec<usize> {
        if column >= store.cols() {
            return (0..len).collect();
        }
        let keys = store.column(column, len);
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| {
            let ordering = keys[a].total_cmp(&keys[b]);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DataKind, Scalar};

    fn int_table(rows: &[[i64; 2]]) -> Table {
        let rows: Vec<Vec<Scalar>> = rows
            .iter()
            .map(|r| r.iter().map(|v| Scalar::Int(*v)).collect())
            .collect();
        Table::from_rows(DataKind::Int, &rows, 2)
    }

    #[test]
    fn test_sort_descending() {
        let mut table = int_table(&[[1, 2], [3, 4]]);
        RowSorter::sort(&mut table, 0, 2, SortDirection::Desc);
        assert_eq!(table.row(0), Some(vec![Scalar::Int(3), Scalar::Int(4)]));
        assert_eq!(table.row(1), Some(vec![Scalar::Int(1), Scalar::Int(2)]));
    }

    #[test]
    fn test_sort_is_stable_both_ways() {
        let table = int_table(&[[2, 0], [1, 1], [2, 2], [1, 3]]);
        assert_eq!(RowSorter::order(&table, 0, 4, SortDirection::Asc), vec![1, 3, 0, 2]);
        assert_eq!(RowSorter::order(&table, 0, 4, SortDirection::Desc), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_staged_rows_untouched() {
        let mut table = int_table(&[[5, 0], [1, 0], [0, 9]]);
        RowSorter::sort(&mut table, 0, 2, SortDirection::Asc);
        assert_eq!(table.column(0, 3), vec![Scalar::Int(1), Scalar::Int(5), Scalar::Int(0)]);
        assert_eq!(table.get(2, 1), Some(Scalar::Int(9)));
    }

    #[test]
    fn test_float_nan_sorts_last() {
        let mut table = Table::from_rows(
            DataKind::Float,
            &[vec![Scalar::Float(f64::NAN)], vec![Scalar::Float(1.0)]],
            1,
        );
        RowSorter::sort(&mut table, 0, 2, SortDirection::Asc);
        assert_eq!(table.get(0, 0), Some(Scalar::Float(1.0)));
    }
}
