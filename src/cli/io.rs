//! JSON output for CLI commands
//!
//! - Success: `{"status": "ok", "data": ...}` on one stdout line
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use crate::cube::CubeSnapshot;

use super::errors::{CliError, CliResult};

/// Reads and parses a snapshot file
pub fn read_snapshot(path: &Path) -> CliResult<CubeSnapshot> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Err(CliError::snapshot_error(format!(
            "{}: empty file",
            path.display()
        )));
    }
    Ok(CubeSnapshot::from_json(&content)?)
}

/// Wraps `data` in the success envelope
pub fn response(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Writes a success response to `out`
pub fn write_response_to(out: &mut impl Write, data: Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, &response(data))?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_response_to(&mut lock, data)
}
