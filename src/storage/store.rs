//! Dense row-major buffer with resize and block-copy primitives

use super::element::Element;

/// Dense `rows x cols` buffer of one element type
///
/// Row `r` occupies `data[r * cols .. (r + 1) * cols]`. Growing the row count
/// therefore never moves existing cells; changing the column count does.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStore<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> Default for TableStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> TableStore<T> {
    /// Creates an empty `0 x 0` buffer
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols: 0,
        }
    }

    /// Creates a zero-filled buffer
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a buffer from row slices. Short rows are zero-padded, long rows truncated.
    pub fn from_rows(rows: &[Vec<T>], cols: usize) -> Self {
        let mut store = Self::zeroed(rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            let n = row.len().min(cols);
            store.data[r * cols..r * cols + n].copy_from_slice(&row[..n]);
        }
        store
    }

    /// Row capacity
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Writes one cell. Returns false when the position is outside the buffer.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            true
        } else {
            false
        }
    }

    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// First `len` values of a column
    pub fn column(&self, col: usize, len: usize) -> Vec<T> {
        if col >= self.cols {
            return Vec::new();
        }
        (0..len.min(self.rows))
            .map(|r| self.data[r * self.cols + col])
            .collect()
    }

    /// Largest row count a buffer with `cols` columns can address
    pub fn max_rows(&self, cols: usize) -> usize {
        let row_bytes = cols.max(1).saturating_mul(std::mem::size_of::<T>().max(1));
        isize::MAX as usize / row_bytes
    }

    /// Resizes to `rows x cols`, keeping every value whose position survives.
    /// `rows` must stay below `max_rows(cols)`.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let len = rows.saturating_mul(cols);
        if cols == self.cols {
            self.data.resize(len, T::default());
        } else {
            let mut data = vec![T::default(); len];
            let keep_cols = cols.min(self.cols);
            for r in 0..rows.min(self.rows) {
                let src = r * self.cols;
                data[r * cols..r * cols + keep_cols]
                    .copy_from_slice(&self.data[src..src + keep_cols]);
            }
            self.data = data;
        }
        self.rows = rows;
        self.cols = cols;
    }

    /// Grows the row capacity so that `row` is addressable, reserving up to
    /// `reserve` extra rows beyond it. Returns whether a resize happened, or
    /// `None` when `row` lies beyond `max_rows` and the store is unchanged.
    pub fn ensure_row(&mut self, row: usize, reserve: usize) -> Option<bool> {
        if row < self.rows {
            return Some(false);
        }
        let limit = self.max_rows(self.cols);
        if row >= limit {
            return None;
        }
        let rows = row.saturating_add(1).saturating_add(reserve).min(limit);
        self.resize(rows, self.cols);
        Some(true)
    }

    /// Builds a new buffer with `mapping.len()` columns, where column `i`
    /// is a full copy of old column `mapping[i]` and `None` is zero-filled.
    pub fn remap_columns(&self, mapping: &[Option<usize>], rows: usize) -> Self {
        let cols = mapping.len();
        let mut out = Self::zeroed(rows, cols);
        let copy_rows = rows.min(self.rows);
        for (dst, src) in mapping.iter().enumerate() {
            let Some(src) = *src else { continue };
            if src >= self.cols {
                continue;
            }
            for r in 0..copy_rows {
                out.data[r * cols + dst] = self.data[r * self.cols + src];
            }
        }
        out
    }

    pub fn zero_row(&mut self, row: usize) {
        if row < self.rows {
            let start = row * self.cols;
            self.data[start..start + self.cols].fill(T::default());
        }
    }

    /// Moves rows `[at, end)` one row down to `[at + 1, end + 1)`.
    ///
    /// Requires `end < rows`. Row `at` keeps its old content.
    pub fn shift_down(&mut self, at: usize, end: usize) {
        if at >= end || end >= self.rows {
            return;
        }
        let cols = self.cols;
        self.data.copy_within(at * cols..end * cols, (at + 1) * cols);
    }

    /// Moves rows `(at, end)` one row up to `[at, end - 1)` and zeroes row `end - 1`.
    pub fn shift_up(&mut self, at: usize, end: usize) {
        let end = end.min(self.rows);
        if at >= end {
            return;
        }
        let cols = self.cols;
        self.data.copy_within((at + 1) * cols..end * cols, at * cols);
        self.zero_row(end - 1);
    }

    /// Reorders the leading rows so that row `i` receives old row `order[i]`.
    pub fn permute_rows(&mut self, order: &[usize]) {
        let cols = self.cols;
        let mut head = Vec::with_capacity(order.len() * cols);
        for &src in order {
            head.extend_from_slice(&self.data[src * cols..(src + 1) * cols]);
        }
        self.data[..head.len()].copy_from_slice(&head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows: usize, cols: usize) -> TableStore<i64> {
        let mut store = TableStore::zeroed(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                store.set(r, c, (r * 10 + c) as i64);
            }
        }
        store
    }

    #[test]
    fn test_grow_rows_preserves_values() {
        let mut store = filled(2, 3);
        store.resize(5, 3);
        assert_eq!(store.rows(), 5);
        assert_eq!(store.get(1, 2), Some(12));
        assert_eq!(store.get(4, 0), Some(0));
    }

    #[test]
    fn test_grow_cols_preserves_positions() {
        let mut store = filled(3, 2);
        store.resize(3, 4);
        assert_eq!(store.get(2, 1), Some(21));
        assert_eq!(store.get(2, 3), Some(0));
    }

    #[test]
    fn test_shrink_truncates() {
        let mut store = filled(4, 4);
        store.resize(2, 2);
        assert_eq!(store.row(1), Some(&[10, 11][..]));
        assert_eq!(store.get(2, 0), None);
    }

    #[test]
    fn test_ensure_row_reserves_margin() {
        let mut store: TableStore<f64> = TableStore::zeroed(0, 2);
        assert_eq!(store.ensure_row(0, 500), Some(true));
        assert_eq!(store.rows(), 501);
        assert_eq!(store.ensure_row(500, 500), Some(false));
        assert_eq!(store.ensure_row(501, 500), Some(true));
        assert_eq!(store.rows(), 1002);
    }

    #[test]
    fn test_ensure_row_beyond_addressable_range() {
        let mut store: TableStore<f64> = TableStore::zeroed(2, 3);
        let limit = store.max_rows(3);
        assert_eq!(limit, isize::MAX as usize / 24);

        assert_eq!(store.ensure_row(usize::MAX, 500), None);
        assert_eq!(store.ensure_row(limit, 0), None);
        assert_eq!(store.rows(), 2);
        assert_eq!(store.cols(), 3);
    }

    #[test]
    fn test_remap_columns_copies_whole_columns() {
        let store = filled(3, 3);
        let out = store.remap_columns(&[Some(2), None, Some(0)], 4);
        assert_eq!(out.column(0, 3), vec![2, 12, 22]);
        assert_eq!(out.column(1, 4), vec![0, 0, 0, 0]);
        assert_eq!(out.column(2, 3), vec![0, 10, 20]);
        assert_eq!(out.rows(), 4);
    }

    #[test]
    fn test_shift_down_and_up() {
        let mut store = filled(4, 1);
        store.shift_down(1, 3);
        assert_eq!(store.column(0, 4), vec![0, 10, 10, 20]);
        store.shift_up(1, 4);
        assert_eq!(store.column(0, 4), vec![0, 10, 20, 0]);
    }

    #[test]
    fn test_permute_rows() {
        let mut store = filled(3, 2);
        store.permute_rows(&[2, 0, 1]);
        assert_eq!(store.column(0, 3), vec![20, 0, 10]);
        assert_eq!(store.column(1, 3), vec![21, 1, 11]);
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let store = TableStore::from_rows(&[vec![1i64, 2], vec![3]], 2);
        assert_eq!(store.row(1), Some(&[3, 0][..]));
    }
}
