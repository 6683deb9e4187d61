//! Column management
//!
//! A datacube keeps two views of its columns:
//!
//! - the field list: ordered names as the caller sees them
//! - the field map: name -> buffer column, describing the buffer as it is
//!
//! Adding, renaming and removing columns edit the list only. A reconcile
//! step rebuilds the buffer by name so that data follows its column, then
//! regenerates the map. Between edits and reconcile the two may disagree.

mod manager;

pub use manager::{ColumnManager, ColumnRef, FieldSlot, Reconciled, AUTO_NAME_PREFIX};
