//! Log events emitted by the datacube library

use std::fmt;

use super::logger::Severity;

/// Observable events in the datacube library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    // Lifecycle
    CubeCreated,
    ConfigLoaded,

    // Storage
    /// Buffer rebuilt after a field list change
    ColumnsRebuilt,
    /// Buffer grew in rows only
    TableResized,
    RowCommitted,

    // Hierarchy
    ChildAttached,
    ChildDetached,

    // Restore
    RestoreBegin,
    RestoreComplete,
    /// A child snapshot failed and was skipped
    RestoreChildSkipped,

    // Notification
    ObserverFailed,
}

impl LogEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEvent::CubeCreated => "CUBE_CREATED",
            LogEvent::ConfigLoaded => "CONFIG_LOADED",
            LogEvent::ColumnsRebuilt => "COLUMNS_REBUILT",
            LogEvent::TableResized => "TABLE_RESIZED",
            LogEvent::RowCommitted => "ROW_COMMITTED",
            LogEvent::ChildAttached => "CHILD_ATTACHED",
            LogEvent::ChildDetached => "CHILD_DETACHED",
            LogEvent::RestoreBegin => "RESTORE_BEGIN",
            LogEvent::RestoreComplete => "RESTORE_COMPLETE",
            LogEvent::RestoreChildSkipped => "RESTORE_CHILD_SKIPPED",
            LogEvent::ObserverFailed => "OBSERVER_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::CubeCreated
            | LogEvent::ColumnsRebuilt
            | LogEvent::TableResized
            | LogEvent::RowCommitted
            | LogEvent::ChildAttached
            | LogEvent::ChildDetached => Severity::Trace,
            LogEvent::ConfigLoaded | LogEvent::RestoreBegin | LogEvent::RestoreComplete => {
                Severity::Info
            }
            LogEvent::RestoreChildSkipped => Severity::Warn,
            LogEvent::ObserverFailed => Severity::Error,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
