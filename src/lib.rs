//! datacube - hierarchical, mutable tabular datacubes
//!
//! A datacube node holds a table of named columns with a row cursor and a
//! committed length, plus metadata and attribute-tagged child nodes.

pub mod cli;
pub mod columns;
pub mod config;
pub mod cube;
pub mod notify;
pub mod observability;
pub mod query;
pub mod storage;
pub mod value;
