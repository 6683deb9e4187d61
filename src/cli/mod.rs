//! CLI module for datacube
//!
//! Read-only commands over snapshot JSON files:
//! - inspect: tree outline and depths
//! - names: column names per tree level
//! - search: matching rows of the root node

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, load_config, names, parse_criterion, run, run_command, search};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_snapshot, write_response, write_response_to};
