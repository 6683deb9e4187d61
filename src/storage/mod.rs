//! Table storage for datacubes
//!
//! The dense buffer behind every datacube node.
//!
//! # Design Principles
//!
//! - Row-major: appending rows never moves existing cells
//! - Resizing preserves every value whose (row, col) position survives
//! - Growth for staged rows reserves a fixed margin so that
//!   "set, commit, repeat" does not resize on every row
//! - Column changes go through a full remap, never in place

mod element;
mod store;
mod table;

pub use element::Element;
pub use store::TableStore;
pub use table::Table;

pub(crate) use table::with_store;
