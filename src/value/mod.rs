//! Value types shared by every datacube subsystem
//!
//! A datacube stores one uniform numeric kind per node. Cell values cross the
//! public API as [`Scalar`] and are converted to the node's kind on write.
//! Free-form maps (child attributes, node parameters) hold [`AttrValue`].

mod attribute;
mod scalar;

pub use attribute::{AttrValue, Attributes};
pub use scalar::{Complex, DataKind, Scalar};
