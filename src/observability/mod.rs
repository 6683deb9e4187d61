//! Observability for datacube nodes
//!
//! - Structured logging (JSON lines)
//! - Per-node counters
//! - A closed catalog of log events
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes a node
//! 2. No background threads
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use datacube::observability::{log_event, LogEvent, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(LogEvent::RowCommitted, &[("cube", "sweep"), ("row", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::LogEvent;
pub use logger::{Logger, Severity};
pub use metrics::{CubeMetrics, MetricsSnapshot};

/// Logs a catalog event at its own severity
pub fn log_event(event: LogEvent, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
