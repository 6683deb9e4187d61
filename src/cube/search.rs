//! Search and sort over committed rows

use crate::notify::CubeEvent;
use crate::query::{Criterion, RowFilter, RowSorter, SortDirection};
use crate::value::Scalar;

use super::datacube::Datacube;
use super::errors::CubeResult;
use super::handle::Cube;

impl Datacube {
    /// Committed rows where every named column equals its expected value,
    /// within `tolerance` for float and complex kinds.
    ///
    /// An unknown column yields no rows; no criteria yields every row.
    pub fn search<K, V>(&self, criteria: impl IntoIterator<Item = (K, V)>, tolerance: f64) -> Vec<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let mut resolved = Vec::new();
        for (name, expected) in criteria {
            match self.columns.index_of(name.as_ref()) {
                Some(col) => resolved.push(Criterion::new(col, expected)),
                None => return Vec::new(),
            }
        }
        RowFilter::matching_rows(&self.table, self.length, &resolved, tolerance)
    }

    /// [`search`](Self::search) with the configured tolerance
    pub fn search_default<K, V>(&self, criteria: impl IntoIterator<Item = (K, V)>) -> Vec<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        self.search(criteria, self.config.search_tolerance)
    }

    pub(super) fn sort_by(&mut self, column: &str, descending: bool) -> CubeResult<()> {
        let col = self.require_column(column)?;
        let direction = SortDirection::from_descending(descending);
        RowSorter::sort(&mut self.table, col, self.length, direction);
        self.touch();
        self.emit(CubeEvent::SortBy(column.to_string()));
        Ok(())
    }
}

impl Cube {
    /// Reorders committed rows by `column`. The sort is stable; child row
    /// anchors are left as they are.
    pub fn sort_by(&self, column: &str, descending: bool) -> CubeResult<()> {
        self.mutate(|node| node.sort_by(column, descending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{CubeError, SetOptions};

    fn sample() -> Cube {
        let cube = Cube::new("sample");
        for (a, b) in [(1.0, 2.0), (3.0, 4.0)] {
            cube.set_with(SetOptions::committed(), [("a", a), ("b", b)])
                .unwrap();
        }
        cube
    }

    #[test]
    fn test_search_and_sort_scenario() {
        let cube = sample();
        assert_eq!(cube.read().search([("a", 3.0)], 1e-8), vec![1]);

        cube.sort_by("a", true).unwrap();
        let expected = vec![
            vec![Scalar::Float(3.0), Scalar::Float(4.0)],
            vec![Scalar::Float(1.0), Scalar::Float(2.0)],
        ];
        assert_eq!(cube.read().table(), expected);
    }

    #[test]
    fn test_unknown_column_returns_nothing() {
        let cube = sample();
        assert!(cube.read().search([("a", 1.0), ("nope", 1.0)], 1e-8).is_empty());
        assert!(matches!(
            cube.sort_by("nope", false),
            Err(CubeError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_staged_rows_are_not_found() {
        let cube = sample();
        cube.set([("a", 3.0)]).unwrap();
        assert_eq!(cube.read().search_default([("a", 3.0)]), vec![1]);
    }
}
