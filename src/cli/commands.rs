//! CLI command implementations
//!
//! Commands load a snapshot into a fresh tree, read from it and print one
//! JSON response. Nothing is ever written back.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::CubeConfig;
use crate::cube::Cube;
use crate::value::Scalar;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_snapshot, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let config = load_config(cli.config.as_deref())?;
    let data = run_command(cli.command, &config)?;
    write_response(data)
}

/// Loads `path`, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> CliResult<CubeConfig> {
    match path {
        Some(path) => Ok(CubeConfig::load(path)?),
        None => {
            let config = CubeConfig::default();
            config.apply_log_level()?;
            Ok(config)
        }
    }
}

/// Run the appropriate command and return its response payload
pub fn run_command(cmd: Command, config: &CubeConfig) -> CliResult<Value> {
    match cmd {
        Command::Inspect { snapshot } => inspect(&snapshot, config),
        Command::Names {
            snapshot,
            common,
            level,
        } => names(&snapshot, config, common, level),
        Command::Search {
            snapshot,
            criteria,
            tolerance,
        } => search(&snapshot, config, &criteria, tolerance),
    }
}

fn load_tree(path: &Path, config: &CubeConfig) -> CliResult<Cube> {
    let snapshot = read_snapshot(path)?;
    Ok(Cube::from_snapshot(&snapshot, config.clone())?)
}

/// Outline, depths and size of the stored tree
pub fn inspect(path: &Path, config: &CubeConfig) -> CliResult<Value> {
    let cube = load_tree(path, config)?;
    let node = cube.read();
    Ok(json!({
        "name": node.name(),
        "kind": node.kind().as_str(),
        "length": node.len(),
        "columns": node.names(),
        "max_depth": node.max_depth(),
        "common_depth": node.common_depth(),
        "structure": node.structure(),
    }))
}

/// Column names, flat down to `level` or per level when `common`
pub fn names(path: &Path, config: &CubeConfig, common: bool, level: isize) -> CliResult<Value> {
    let cube = load_tree(path, config)?;
    let node = cube.read();
    if common {
        Ok(json!({ "levels": node.common_names() }))
    } else {
        Ok(json!({ "level": level, "names": node.names_up_to(level) }))
    }
}

/// Splits `column=value` and parses the value literal
pub fn parse_criterion(text: &str) -> CliResult<(String, Scalar)> {
    let (column, literal) = text
        .split_once('=')
        .ok_or_else(|| CliError::invalid_argument(format!("expected COLUMN=VALUE, got '{}'", text)))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "missing column name in '{}'",
            text
        )));
    }
    let value = Scalar::parse(literal)
        .ok_or_else(|| CliError::invalid_argument(format!("not a value: '{}'", literal)))?;
    Ok((column.to_string(), value))
}

/// Committed root rows matching every criterion
pub fn search(
    path: &Path,
    config: &CubeConfig,
    criteria: &[String],
    tolerance: Option<f64>,
) -> CliResult<Value> {
    let parsed = criteria
        .iter()
        .map(|text| parse_criterion(text))
        .collect::<CliResult<Vec<_>>>()?;
    let tolerance = tolerance.unwrap_or(config.search_tolerance);
    if tolerance.is_nan() || tolerance < 0.0 {
        return Err(CliError::invalid_argument(format!(
            "tolerance must be non-negative, got {}",
            tolerance
        )));
    }

    let cube = load_tree(path, config)?;
    let node = cube.read();
    let rows = node.search(parsed, tolerance);
    let mut values = Vec::with_capacity(rows.len());
    for &row in &rows {
        let cells: Vec<String> = node.row_at(row)?.iter().map(Scalar::to_string).collect();
        values.push(cells);
    }
    Ok(json!({
        "columns": node.names(),
        "rows": rows,
        "values": values,
    }))
}
