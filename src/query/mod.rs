//! Search and sort kernels
//!
//! Both operate on committed rows only and take columns already resolved
//! to buffer indices. Name resolution and unknown-column handling live in
//! the datacube node.

mod filter;
mod sorter;

pub use filter::{Criterion, RowFilter};
pub use sorter::{RowSorter, SortDirection};
