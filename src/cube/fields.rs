//! Column operations on a node
//!
//! Every edit goes through the column manager and is followed by a
//! reconcile, so the buffer layout never lags behind the field list
//! once an operation returns.

use crate::columns::ColumnRef;
use crate::notify::CubeEvent;
use crate::value::Scalar;

use super::datacube::Datacube;
use super::errors::CubeResult;
use super::handle::Cube;

impl Datacube {
    pub(super) fn add_column(
        &mut self,
        name: Option<&str>,
        index: Option<isize>,
    ) -> CubeResult<usize> {
        let slot = self
            .columns
            .add_field(name, index, self.config.max_auto_names)?;
        if slot.created {
            self.sync_columns(0);
            self.touch();
            self.emit_names();
        }
        Ok(slot.index)
    }

    pub(super) fn rename_column(
        &mut self,
        old: &str,
        new: Option<&str>,
    ) -> CubeResult<Option<String>> {
        let renamed = self
            .columns
            .rename(old, new, self.config.max_auto_names)?;
        if let Some(name) = &renamed {
            if name != old {
                self.sync_columns(0);
                self.touch();
                self.emit_names();
            }
        }
        Ok(renamed)
    }

    pub(super) fn remove_columns(&mut self, targets: &[ColumnRef]) -> Vec<String> {
        let removed = self.columns.remove(targets);
        if !removed.is_empty() {
            self.sync_columns(0);
            self.touch();
            self.emit_names();
            self.emit(CubeEvent::Commit { row: self.cursor });
        }
        removed
    }

    pub(super) fn set_column(
        &mut self,
        name: Option<&str>,
        column_index: Option<isize>,
        offset_row: isize,
        values: Option<&[Scalar]>,
    ) -> CubeResult<usize> {
        let slot = self
            .columns
            .add_field(name, column_index, self.config.max_auto_names)?;
        let offset = if offset_row < 0 {
            (self.length as isize + offset_row + 1).max(0) as usize
        } else {
            offset_row as usize
        };
        if let Some(values) = values {
            self.length = self.length.max(offset + values.len());
        }
        self.sync_columns(self.length);
        if let Some(values) = values {
            for (i, value) in values.iter().enumerate() {
                self.table.set(offset + i, slot.index, *value);
            }
        }
        self.touch();

        self.emit_names();
        if values.is_some() {
            self.emit(CubeEvent::Commit { row: offset });
        }
        Ok(slot.index)
    }
}

impl Cube {
    /// Appends column `name` unless it exists; returns its index
    pub fn add_column(&self, name: &str) -> CubeResult<usize> {
        self.insert_column(Some(name), None)
    }

    /// Inserts a column at `index` (negative counts from the end, `-1`
    /// appends). An unset name becomes `New_<n>`. Existing names keep their
    /// position.
    pub fn insert_column(&self, name: Option<&str>, index: Option<isize>) -> CubeResult<usize> {
        self.mutate(|node| node.add_column(name, index))
    }

    /// Renames `old`; returns the new name, or `None` if `old` is unknown
    pub fn rename_column(&self, old: &str, new: Option<&str>) -> CubeResult<Option<String>> {
        self.mutate(|node| node.rename_column(old, new))
    }

    /// Removes columns by name or index; unknown ones are ignored.
    /// The data of a removed column is gone for good.
    pub fn remove_columns<R>(&self, targets: impl IntoIterator<Item = R>) -> CubeResult<Vec<String>>
    where
        R: Into<ColumnRef>,
    {
        let targets: Vec<ColumnRef> = targets.into_iter().map(Into::into).collect();
        self.mutate(|node| Ok(node.remove_columns(&targets)))
    }

    pub fn remove_column(&self, target: impl Into<ColumnRef>) -> CubeResult<Vec<String>> {
        self.remove_columns([target.into()])
    }

    /// Creates or overwrites a column, writing `values` from `offset_row`
    /// on and growing the length to cover them
    pub fn set_column(
        &self,
        name: Option<&str>,
        column_index: Option<isize>,
        offset_row: isize,
        values: Option<&[Scalar]>,
    ) -> CubeResult<usize> {
        self.mutate(|node| node.set_column(name, column_index, offset_row, values))
    }
}
