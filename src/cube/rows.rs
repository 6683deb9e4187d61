//! Row protocol: staged writes, commits and the cursor
//!
//! Rows `[0, len)` are committed; rows at or beyond `len` are staged
//! scratch space. `set` writes without changing the length, `commit`
//! validates a row and grows the length monotonically. Only row removal
//! shrinks it.

use crate::notify::CubeEvent;
use crate::observability::LogEvent;
use crate::value::Scalar;

use super::datacube::Datacube;
use super::errors::{CubeError, CubeResult};
use super::handle::Cube;

/// Options for [`Cube::set_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Target row; the cursor when unset. Negative values count from the
    /// end so that `-1` is the next append slot.
    pub row: Option<isize>,
    /// Creation order for columns that do not exist yet
    pub column_order: Vec<String>,
    /// Commit the row afterwards (advances the cursor)
    pub commit: bool,
    /// Emit `commit` for the row without committing it
    pub notify: bool,
    /// Grow the length to cover the row without a commit event
    pub extend_length: bool,
}

impl SetOptions {
    pub fn at(row: isize) -> Self {
        Self {
            row: Some(row),
            ..Self::default()
        }
    }

    pub fn committed() -> Self {
        Self {
            commit: true,
            ..Self::default()
        }
    }
}

/// Options for [`Cube::insert_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptions {
    /// Reference row; the cursor when unset. Negative values count from
    /// the end so that `-1` is the last committed row.
    pub at: Option<isize>,
    /// Insert before the reference row rather than after it
    pub before: bool,
    /// Number of adjacent rows to insert
    pub count: usize,
    /// Commit every inserted row (advances the cursor)
    pub commit: bool,
    /// Emit `commit` for every inserted row
    pub notify: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            at: None,
            before: true,
            count: 1,
            commit: false,
            notify: true,
        }
    }
}

/// Cell values keyed by column name
pub type RowValues = Vec<(String, Scalar)>;

fn collect_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> RowValues
where
    K: AsRef<str>,
    V: Into<Scalar>,
{
    values
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.into()))
        .collect()
}

impl Datacube {
    fn resolve_set_row(&self, row: Option<isize>) -> usize {
        match row {
            None => self.cursor,
            Some(r) if r < 0 => (self.length as isize + r + 1).max(0) as usize,
            Some(r) => r as usize,
        }
    }

    fn resolve_insert_row(&self, at: Option<isize>, before: bool) -> usize {
        let index = match at {
            None => self.cursor,
            Some(r) if r < 0 => (self.length as isize + r).max(0) as usize,
            Some(r) => r as usize,
        };
        if before {
            index
        } else {
            index + 1
        }
    }

    /// Creates missing columns (ordered ones first), makes `row`
    /// addressable and writes `values`. Returns true if columns were added.
    fn write_row(
        &mut self,
        row: usize,
        column_order: &[String],
        values: &[(String, Scalar)],
    ) -> CubeResult<bool> {
        let widest = self.columns.len() + column_order.len() + values.len();
        let limit = self.table.max_rows(widest);
        if row >= limit {
            return Err(CubeError::out_of_range(row, limit));
        }

        let max = self.config.max_auto_names;
        let mut created = false;
        let pending = column_order
            .iter()
            .chain(values.iter().map(|(name, _)| name));
        for name in pending {
            created |= self.columns.add_field(Some(name.as_str()), None, max)?.created;
        }

        self.ensure_row(row)?;
        for (name, value) in values {
            let col = self.require_column(name)?;
            self.table.set(row, col, *value);
        }
        Ok(created)
    }

    pub(super) fn set_values(
        &mut self,
        options: &SetOptions,
        values: &[(String, Scalar)],
    ) -> CubeResult<usize> {
        let row = self.resolve_set_row(options.row);
        let created = self.write_row(row, &options.column_order, values)?;
        if options.extend_length && row >= self.length {
            self.length = row + 1;
        }
        self.touch();

        if created {
            self.emit_names();
        }
        if !values.is_empty() {
            if options.commit {
                self.commit(Some(row), true)?;
            } else if options.notify {
                self.emit(CubeEvent::Commit { row });
            }
        }
        Ok(row)
    }

    /// Validates `row` (the cursor when unset), growing the length to cover
    /// it; with `advance` the cursor moves to the following row.
    pub(super) fn commit(&mut self, row: Option<usize>, advance: bool) -> CubeResult<usize> {
        let row = row.unwrap_or(self.cursor);
        let limit = self.capacity().max(self.length + 1);
        if row >= limit {
            return Err(CubeError::out_of_range(row, limit));
        }

        if row >= self.length {
            self.ensure_row(row)?;
            self.length = row + 1;
        }
        if advance {
            self.cursor = row + 1;
        }
        self.metrics.increment_commits();
        let shown = row.to_string();
        self.log(LogEvent::RowCommitted, &[("row", shown.as_str())]);
        self.touch();
        self.emit(CubeEvent::Commit { row });
        Ok(row)
    }

    pub(super) fn go_to(&mut self, row: usize) -> CubeResult<()> {
        if row > self.length {
            return Err(CubeError::out_of_range(row, self.length));
        }
        self.cursor = row;
        Ok(())
    }

    pub(super) fn insert_rows(
        &mut self,
        options: &InsertOptions,
        values: &[(String, Scalar)],
    ) -> CubeResult<usize> {
        let first = self.resolve_insert_row(options.at, options.before);
        let end = first
            .checked_add(options.count)
            .ok_or_else(|| CubeError::out_of_range(first, self.table.max_rows(self.table.cols())))?;
        let mut created = false;
        for index in first..end {
            if index < self.length {
                self.ensure_row(self.length)?;
                self.table.shift_down(index, self.length);
                self.table.zero_row(index);
                self.length += 1;
                if self.cursor >= index {
                    self.cursor += 1;
                }
            }
            created |= self.write_row(index, &[], values)?;
        }
        self.touch();

        if created {
            self.emit_names();
        }
        for index in first..end {
            if options.commit {
                self.commit(Some(index), true)?;
            } else if options.notify {
                self.emit(CubeEvent::Commit { row: index });
            }
        }
        Ok(first)
    }

    pub(super) fn remove_row(&mut self, at: usize) -> CubeResult<()> {
        if at >= self.length {
            return Err(CubeError::out_of_range(at, self.length));
        }
        self.table.shift_up(at, self.length);
        self.length -= 1;
        if self.cursor >= at && self.cursor > 0 {
            self.cursor -= 1;
        }
        self.touch();
        self.emit(CubeEvent::Commit { row: at });
        Ok(())
    }

    /// Removes every listed row; indices refer to the rows before removal
    pub(super) fn remove_rows(&mut self, rows: &[usize]) -> CubeResult<usize> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.length) {
            return Err(CubeError::out_of_range(bad, self.length));
        }
        let mut sorted = rows.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for &row in &sorted {
            self.remove_row(row)?;
        }
        Ok(sorted.len())
    }

    pub(super) fn clear_row(&mut self) -> CubeResult<()> {
        self.ensure_row(self.cursor)?;
        self.table.zero_row(self.cursor);
        self.touch();
        self.emit(CubeEvent::ClearRow);
        Ok(())
    }
}

impl Cube {
    /// Writes `values` at the cursor row, creating missing columns.
    /// Returns the row written.
    pub fn set<K, V>(&self, values: impl IntoIterator<Item = (K, V)>) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        self.set_with(SetOptions::default(), values)
    }

    /// Writes `values` at `row` without moving the cursor
    pub fn set_at<K, V>(
        &self,
        row: isize,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        self.set_with(SetOptions::at(row), values)
    }

    pub fn set_with<K, V>(
        &self,
        options: SetOptions,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let values = collect_values(values);
        self.mutate(|node| node.set_values(&options, &values))
    }

    /// Commits the cursor row and advances the cursor
    pub fn commit(&self) -> CubeResult<usize> {
        self.commit_with(None, true)
    }

    /// Commits `row` (the cursor when unset). Rows beyond the allocated
    /// capacity and the next append slot are rejected.
    pub fn commit_with(&self, row: Option<usize>, advance: bool) -> CubeResult<usize> {
        self.mutate(|node| node.commit(row, advance))
    }

    /// Moves the cursor to `row`, at most the length
    pub fn go_to(&self, row: usize) -> CubeResult<()> {
        self.mutate(|node| node.go_to(row))
    }

    /// Moves the cursor to the next append slot
    pub fn go_to_end(&self) -> CubeResult<()> {
        self.mutate(|node| {
            let end = node.length;
            node.go_to(end)
        })
    }

    /// Commits the next append slot without moving the cursor
    pub fn add_row(&self) -> CubeResult<usize> {
        self.mutate(|node| {
            let row = node.length;
            node.commit(Some(row), false)
        })
    }

    /// Inserts one row before `at` (the cursor when unset) and writes
    /// `values` into it. Returns the index of the new row.
    pub fn insert_row<K, V>(
        &self,
        at: Option<isize>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let options = InsertOptions {
            at,
            ..InsertOptions::default()
        };
        self.insert_with(options, values)
    }

    /// Inserts `count` adjacent rows before `at`, each holding `values`
    pub fn insert_rows<K, V>(
        &self,
        at: Option<isize>,
        count: usize,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let options = InsertOptions {
            at,
            count,
            ..InsertOptions::default()
        };
        self.insert_with(options, values)
    }

    pub fn insert_with<K, V>(
        &self,
        options: InsertOptions,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> CubeResult<usize>
    where
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let values = collect_values(values);
        self.mutate(|node| node.insert_rows(&options, &values))
    }

    /// Removes committed row `at`; emits `commit(at)`
    pub fn remove_row(&self, at: usize) -> CubeResult<()> {
        self.mutate(|node| node.remove_row(at))
    }

    /// Removes several committed rows, highest index first
    pub fn remove_rows(&self, rows: &[usize]) -> CubeResult<usize> {
        self.mutate(|node| node.remove_rows(rows))
    }

    /// Zeroes every value of the cursor row
    pub fn clear_row(&self) -> CubeResult<()> {
        self.mutate(|node| node.clear_row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CubeConfig;
    use crate::value::DataKind;

    fn row(values: &[f64]) -> Vec<Scalar> {
        values.iter().map(|v| Scalar::Float(*v)).collect()
    }

    #[test]
    fn test_set_is_staged_until_commit() {
        let cube = Cube::new("staged");
        cube.set([("a", 1.0), ("b", 2.0)]).unwrap();
        assert_eq!(cube.len(), 0);
        assert!(cube.read().table().is_empty());
        assert_eq!(cube.read().value("a", 0).unwrap(), Scalar::Float(1.0));

        cube.commit().unwrap();
        assert_eq!(cube.read().table(), vec![row(&[1.0, 2.0])]);
        assert_eq!(cube.cursor(), 1);
    }

    #[test]
    fn test_column_order_is_honored() {
        let cube = Cube::new("ordered");
        let options = SetOptions {
            column_order: vec!["z".into(), "y".into()],
            ..SetOptions::default()
        };
        cube.set_with(options, [("x", 1.0), ("y", 2.0), ("z", 3.0)])
            .unwrap();
        assert_eq!(cube.read().names(), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_negative_row_resolution() {
        let cube = Cube::new("neg");
        for v in [1.0, 2.0] {
            cube.set_with(SetOptions::committed(), [("a", v)]).unwrap();
        }
        assert_eq!(cube.set_at(-1, [("a", 9.0)]).unwrap(), 2);
        assert_eq!(cube.set_at(-4, [("a", 7.0)]).unwrap(), 0);
        assert_eq!(cube.read().column("a").unwrap(), row(&[7.0, 2.0]));
    }

    #[test]
    fn test_commit_beyond_capacity_rejected() {
        let cube = Cube::new("bounds");
        assert!(matches!(
            cube.commit_with(Some(3), true),
            Err(CubeError::OutOfRangeIndex { .. })
        ));
        cube.commit_with(Some(0), false).unwrap();
        assert_eq!(cube.len(), 1);
        assert_eq!(cube.cursor(), 0);
    }

    #[test]
    fn test_go_to_bounds() {
        let cube = Cube::new("cursor");
        cube.add_row().unwrap();
        cube.go_to(1).unwrap();
        assert!(cube.go_to(2).is_err());
        assert_eq!(cube.cursor(), 1);
    }

    #[test]
    fn test_insert_shifts_rows_and_cursor() {
        let cube = Cube::new("insert");
        for v in [1.0, 2.0, 3.0] {
            cube.set_with(SetOptions::committed(), [("a", v)]).unwrap();
        }
        assert_eq!(cube.cursor(), 3);
        let at = cube.insert_row(Some(1), [("a", 9.0)]).unwrap();
        assert_eq!(at, 1);
        assert_eq!(cube.len(), 4);
        assert_eq!(cube.cursor(), 4);
        assert_eq!(cube.read().column("a").unwrap(), row(&[1.0, 9.0, 2.0, 3.0]));
    }

    #[test]
    fn test_remove_rows_descending() {
        let cube = Cube::new("remove");
        for v in [0.0, 1.0, 2.0, 3.0] {
            cube.set_with(SetOptions::committed(), [("a", v)]).unwrap();
        }
        assert_eq!(cube.remove_rows(&[0, 2, 2]).unwrap(), 2);
        assert_eq!(cube.read().column("a").unwrap(), row(&[1.0, 3.0]));
        assert_eq!(cube.cursor(), 2);
        assert!(cube.remove_row(5).is_err());
    }

    #[test]
    fn test_clear_row_keeps_length() {
        let cube = Cube::new("clear");
        cube.set_with(SetOptions::committed(), [("a", 4.0)]).unwrap();
        cube.go_to(0).unwrap();
        cube.clear_row().unwrap();
        assert_eq!(cube.len(), 1);
        assert_eq!(cube.read().column("a").unwrap(), row(&[0.0]));
    }

    #[test]
    fn test_unaddressable_row_rejected() {
        let cube = Cube::new("huge");
        cube.set_with(SetOptions::committed(), [("a", 1.0)]).unwrap();
        let capacity = cube.read().capacity();

        let err = cube.set_at(isize::MAX, [("a", 2.0), ("b", 3.0)]).unwrap_err();
        assert!(matches!(err, CubeError::OutOfRangeIndex { index, .. } if index == isize::MAX as usize));
        assert_eq!(cube.read().names(), vec!["a"]);
        assert_eq!(cube.read().capacity(), capacity);
        assert_eq!(cube.len(), 1);
    }

    #[test]
    fn test_append_reserve_amortizes_growth() {
        let config = CubeConfig {
            append_reserve: 10,
            ..CubeConfig::default()
        };
        let cube = Cube::builder("grow")
            .kind(DataKind::Int)
            .config(config)
            .build();
        for i in 0..11i64 {
            cube.set_with(SetOptions::committed(), [("i", i)]).unwrap();
        }
        assert_eq!(cube.len(), 11);
        assert_eq!(cube.read().capacity(), 11);
        cube.set_with(SetOptions::committed(), [("i", 11i64)]).unwrap();
        assert_eq!(cube.read().capacity(), 22);
    }
}
