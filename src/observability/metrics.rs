//! Per-node counters
//!
//! - Counters only
//! - Monotonic increase
//! - Relaxed atomics; values are exact once the mutating call returns

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters of one datacube node
#[derive(Debug, Default)]
pub struct CubeMetrics {
    /// Buffer rebuilds caused by field list changes
    column_rebuilds: AtomicU64,
    /// Row-only buffer growth
    table_resizes: AtomicU64,
    commits: AtomicU64,
    events_published: AtomicU64,
    observer_failures: AtomicU64,
}

impl CubeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_column_rebuilds(&self) {
        self.column_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_table_resizes(&self) {
        self.table_resizes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_events_published(&self, count: u64) {
        self.events_published.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_observer_failures(&self) {
        self.observer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            column_rebuilds: self.column_rebuilds.load(Ordering::Relaxed),
            table_resizes: self.table_resizes.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            observer_failures: self.observer_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`CubeMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub column_rebuilds: u64,
    pub table_resizes: u64,
    pub commits: u64,
    pub events_published: u64,
    pub observer_failures: u64,
}
