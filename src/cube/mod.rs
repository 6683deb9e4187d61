//! Hierarchical datacube nodes
//!
//! A node is a mutable table (ordered columns of one numeric kind, a row
//! cursor and a committed length) plus metadata and an ordered list of
//! attribute-tagged child nodes.
//!
//! # Design Principles
//!
//! - Reads go through [`Cube::read`], mutations through [`Cube`] methods
//! - Every mutation raises its events after the node is released, in order,
//!   before the call returns
//! - Structural mistakes are rejected before anything changes
//! - The parent edge owns; the child edge is weak

mod datacube;
mod errors;
mod fields;
mod handle;
mod hierarchy;
mod rows;
mod search;
mod snapshot;
mod traversal;

pub use datacube::{CubeId, Datacube};
pub use errors::{CubeError, CubeErrorCode, CubeResult, Severity};
pub use handle::{Cube, CubeBuilder, WeakCube};
pub use hierarchy::{ChildItem, ROW_ATTRIBUTE};
pub use rows::{InsertOptions, RowValues, SetOptions};
pub use snapshot::{ChildSnapshot, CubeSnapshot, RestoreReport, SNAPSHOT_FORMAT_VERSION};
pub use traversal::{FamilyTree, NameTree};
