//! Datacube error types
//!
//! Error codes:
//! - CUBE_INVALID_HIERARCHY (REJECT)
//! - CUBE_UNKNOWN_COLUMN (REJECT)
//! - CUBE_OUT_OF_RANGE_INDEX (REJECT)
//! - CUBE_COLUMN_NAME_EXHAUSTED (REJECT)
//! - CUBE_DUPLICATE_COLUMN (REJECT)
//! - CUBE_CHILD_NOT_FOUND (REJECT)
//! - CUBE_INVALID_SNAPSHOT (REJECT)
//! - CUBE_OBSERVER_FAILED (ERROR)
//! - CUBE_SERIALIZATION_FAILED (ERROR)
//! - CUBE_CONCURRENT_COMMIT_RACE (documented only, never raised)

use std::fmt;

use thiserror::Error;

use crate::notify::ObserverError;

/// Severity levels for datacube errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller mistake; the node is unchanged
    Reject,
    /// A collaborator failed after the node was mutated
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeErrorCode {
    InvalidHierarchy,
    UnknownColumn,
    OutOfRangeIndex,
    ColumnNameExhausted,
    DuplicateColumn,
    ChildNotFound,
    InvalidSnapshot,
    ObserverFailed,
    SerializationFailed,
    /// Two writers advancing the same cursor with `commit`. The row protocol
    /// does not serialize writers and cannot detect this; callers sharing a
    /// node must coordinate.
    ConcurrentCommitRace,
}

impl CubeErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            CubeErrorCode::InvalidHierarchy => "CUBE_INVALID_HIERARCHY",
            CubeErrorCode::UnknownColumn => "CUBE_UNKNOWN_COLUMN",
            CubeErrorCode::OutOfRangeIndex => "CUBE_OUT_OF_RANGE_INDEX",
            CubeErrorCode::ColumnNameExhausted => "CUBE_COLUMN_NAME_EXHAUSTED",
            CubeErrorCode::DuplicateColumn => "CUBE_DUPLICATE_COLUMN",
            CubeErrorCode::ChildNotFound => "CUBE_CHILD_NOT_FOUND",
            CubeErrorCode::InvalidSnapshot => "CUBE_INVALID_SNAPSHOT",
            CubeErrorCode::ObserverFailed => "CUBE_OBSERVER_FAILED",
            CubeErrorCode::SerializationFailed => "CUBE_SERIALIZATION_FAILED",
            CubeErrorCode::ConcurrentCommitRace => "CUBE_CONCURRENT_COMMIT_RACE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CubeErrorCode::ObserverFailed
            | CubeErrorCode::SerializationFailed
            | CubeErrorCode::ConcurrentCommitRace => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for CubeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Datacube errors
#[derive(Debug, Error)]
pub enum CubeError {
    /// Self-attach, duplicate attach, or an attach that would close a cycle
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Cursor, commit target or row index beyond its bound
    #[error("Index {index} out of range (limit {limit})")]
    OutOfRangeIndex { index: usize, limit: usize },

    /// `New_<n>` auto naming found no free name
    #[error("No free column name after {0} attempts")]
    ColumnNameExhausted(usize),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Child not found: {0}")]
    ChildNotFound(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// An observer rejected an event. The mutation that emitted it has been applied.
    #[error("Observer failed: {0}")]
    Observer(#[from] ObserverError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CubeError {
    pub fn invalid_hierarchy(reason: impl Into<String>) -> Self {
        CubeError::InvalidHierarchy(reason.into())
    }

    pub fn unknown_column(name: impl Into<String>) -> Self {
        CubeError::UnknownColumn(name.into())
    }

    pub fn out_of_range(index: usize, limit: usize) -> Self {
        CubeError::OutOfRangeIndex { index, limit }
    }

    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        CubeError::InvalidSnapshot(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> CubeErrorCode {
        match self {
            CubeError::InvalidHierarchy(_) => CubeErrorCode::InvalidHierarchy,
            CubeError::UnknownColumn(_) => CubeErrorCode::UnknownColumn,
            CubeError::OutOfRangeIndex { .. } => CubeErrorCode::OutOfRangeIndex,
            CubeError::ColumnNameExhausted(_) => CubeErrorCode::ColumnNameExhausted,
            CubeError::DuplicateColumn(_) => CubeErrorCode::DuplicateColumn,
            CubeError::ChildNotFound(_) => CubeErrorCode::ChildNotFound,
            CubeError::InvalidSnapshot(_) => CubeErrorCode::InvalidSnapshot,
            CubeError::Observer(_) => CubeErrorCode::ObserverFailed,
            CubeError::Serialization(_) => CubeErrorCode::SerializationFailed,
        }
    }

    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// True when the node was left untouched
    pub fn is_rejection(&self) -> bool {
        self.severity() == Severity::Reject
    }
}

/// Result type for datacube operations
pub type CubeResult<T> = Result<T, CubeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CubeError::invalid_hierarchy("self").code().code(),
            "CUBE_INVALID_HIERARCHY"
        );
        assert_eq!(
            CubeError::unknown_column("x").code().code(),
            "CUBE_UNKNOWN_COLUMN"
        );
        assert_eq!(
            CubeError::out_of_range(5, 3).code().code(),
            "CUBE_OUT_OF_RANGE_INDEX"
        );
        assert_eq!(
            CubeErrorCode::ConcurrentCommitRace.code(),
            "CUBE_CONCURRENT_COMMIT_RACE"
        );
    }

    #[test]
    fn test_structural_errors_are_rejections() {
        assert!(CubeError::invalid_hierarchy("dup").is_rejection());
        assert!(CubeError::ColumnNameExhausted(1000).is_rejection());
        assert!(!CubeError::Observer(ObserverError::new("boom")).is_rejection());
    }

    #[test]
    fn test_display_includes_context() {
        let err = CubeError::out_of_range(7, 4);
        let display = err.to_string();
        assert!(display.contains('7'));
        assert!(display.contains('4'));
    }
}
