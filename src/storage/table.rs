//! Kind-tagged table buffer
//!
//! A datacube picks its numeric kind at creation; `Table` holds the matching
//! typed [`TableStore`] and converts [`Scalar`] values at the boundary.

use crate::value::{Complex, DataKind, Scalar};

use super::element::Element;
use super::store::TableStore;

/// Dense buffer of a datacube, one variant per numeric kind
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Int(TableStore<i64>),
    Float(TableStore<f64>),
    Complex(TableStore<Complex>),
    Bool(TableStore<bool>),
}

/// Runs `$body` with `$store` bound to the typed store of any variant
macro_rules! with_store {
    ($table:expr, $store:ident => $body:expr) => {
        match $table {
            Table::Int($store) => $body,
            Table::Float($store) => $body,
            Table::Complex($store) => $body,
            Table::Bool($store) => $body,
        }
    };
}

pub(crate) use with_store;

impl Table {
    /// Creates an empty buffer of the given kind
    pub fn new(kind: DataKind) -> Self {
        Self::zeroed(kind, 0, 0)
    }

    pub fn zeroed(kind: DataKind, rows: usize, cols: usize) -> Self {
        match kind {
            DataKind::Int => Table::Int(TableStore::zeroed(rows, cols)),
            DataKind::Float => Table::Float(TableStore::zeroed(rows, cols)),
            DataKind::Complex => Table::Complex(TableStore::zeroed(rows, cols)),
            DataKind::Bool => Table::Bool(TableStore::zeroed(rows, cols)),
        }
    }

    /// Builds a buffer from scalar rows, casting every value to `kind`
    pub fn from_rows(kind: DataKind, rows: &[Vec<Scalar>], cols: usize) -> Self {
        fn typed<T: Element>(rows: &[Vec<Scalar>], cols: usize) -> TableStore<T> {
            let converted: Vec<Vec<T>> = rows
                .iter()
                .map(|row| row.iter().map(|v| T::from_scalar(*v)).collect())
                .collect();
            TableStore::from_rows(&converted, cols)
        }

        match kind {
            DataKind::Int => Table::Int(typed(rows, cols)),
            DataKind::Float => Table::Float(typed(rows, cols)),
            DataKind::Complex => Table::Complex(typed(rows, cols)),
            DataKind::Bool => Table::Bool(typed(rows, cols)),
        }
    }

    pub fn kind(&self) -> DataKind {
        match self {
            Table::Int(_) => DataKind::Int,
            Table::Float(_) => DataKind::Float,
            Table::Complex(_) => DataKind::Complex,
            Table::Bool(_) => DataKind::Bool,
        }
    }

    /// Row capacity, committed and staged rows together
    pub fn rows(&self) -> usize {
        with_store!(self, s => s.rows())
    }

    pub fn cols(&self) -> usize {
        with_store!(self, s => s.cols())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Scalar> {
        with_store!(self, s => s.get(row, col).map(Element::to_scalar))
    }

    /// Writes one cell, casting `value` to the buffer kind
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> bool {
        with_store!(self, s => s.set(row, col, Element::from_scalar(value)))
    }

    pub fn row(&self, row: usize) -> Option<Vec<Scalar>> {
        with_store!(self, s => s
            .row(row)
            .map(|cells| cells.iter().map(|v| v.to_scalar()).collect()))
    }

    /// First `len` values of a column
    pub fn column(&self, col: usize, len: usize) -> Vec<Scalar> {
        with_store!(self, s => s
            .column(col, len)
            .into_iter()
            .map(Element::to_scalar)
            .collect())
    }

    /// Rows `0..len` as scalar rows
    pub fn head(&self, len: usize) -> Vec<Vec<Scalar>> {
        (0..len.min(self.rows()))
            .filter_map(|r| self.row(r))
            .collect()
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        with_store!(self, s => s.resize(rows, cols))
    }

    pub fn ensure_row(&mut self, row: usize, reserve: usize) -> Option<bool> {
        with_store!(self, s => s.ensure_row(row, reserve))
    }

    pub fn max_rows(&self, cols: usize) -> usize {
        with_store!(self, s => s.max_rows(cols))
    }

    pub fn remap_columns(&self, mapping: &[Option<usize>], rows: usize) -> Table {
        match self {
            Table::Int(s) => Table::Int(s.remap_columns(mapping, rows)),
            Table::Float(s) => Table::Float(s.remap_columns(mapping, rows)),
            Table::Complex(s) => Table::Complex(s.remap_columns(mapping, rows)),
            Table::Bool(s) => Table::Bool(s.remap_columns(mapping, rows)),
        }
    }

    pub fn zero_row(&mut self, row: usize) {
        with_store!(self, s => s.zero_row(row))
    }

    pub fn shift_down(&mut self, at: usize, end: usize) {
        with_store!(self, s => s.shift_down(at, end))
    }

    pub fn shift_up(&mut self, at: usize, end: usize) {
        with_store!(self, s => s.shift_up(at, end))
    }

    pub fn permute_rows(&mut self, order: &[usize]) {
        with_store!(self, s => s.permute_rows(order))
    }
}
