//! Dataset node state, metadata and read accessors

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::columns::{ColumnManager, Reconciled};
use crate::config::CubeConfig;
use crate::notify::{ChildRef, CubeEvent, MetaSnapshot, NotificationBus};
use crate::observability::{log_event, CubeMetrics, LogEvent, MetricsSnapshot};
use crate::storage::Table;
use crate::value::{AttrValue, Attributes, DataKind, Scalar};

use super::errors::{CubeError, CubeResult};
use super::hierarchy::ChildItem;
use super::handle::WeakCube;

/// Stable identity of a datacube node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeId(Uuid);

impl CubeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CubeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CubeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One dataset node: metadata, columns, rows and child links
///
/// Read access goes through [`Cube::read`](super::Cube::read). Every
/// mutation goes through the [`Cube`](super::Cube) handle so that its
/// events are delivered once the node is no longer borrowed.
pub struct Datacube {
    pub(super) id: CubeId,
    pub(super) name: String,
    pub(super) description: String,
    pub(super) tags: String,
    pub(super) kind: DataKind,
    pub(super) filename: Option<PathBuf>,
    pub(super) parameters: Attributes,
    pub(super) defaults: Attributes,
    pub(super) created_at: DateTime<Utc>,
    pub(super) modified_at: DateTime<Utc>,
    pub(super) unsaved: bool,

    pub(super) columns: ColumnManager,
    pub(super) table: Table,
    /// Committed rows `[0, length)`
    pub(super) length: usize,
    /// Current row, in `[0, length]`
    pub(super) cursor: usize,

    pub(super) children: Vec<ChildItem>,
    pub(super) parent: Option<WeakCube>,

    pub(super) config: CubeConfig,
    pub(super) bus: NotificationBus,
    pub(super) metrics: CubeMetrics,
    /// Events raised by the current mutation, delivered by the handle
    pub(super) outbox: Vec<CubeEvent>,
}

impl fmt::Debug for Datacube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datacube")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("columns", &self.columns.names())
            .field("length", &self.length)
            .field("cursor", &self.cursor)
            .field("children", &self.children.len())
            .finish()
    }
}

impl Datacube {
    pub(super) fn new(
        name: String,
        kind: DataKind,
        defaults: Attributes,
        config: CubeConfig,
    ) -> Self {
        let now = Utc::now();
        let node = Self {
            id: CubeId::new(),
            name,
            description: String::new(),
            tags: String::new(),
            kind,
            filename: None,
            parameters: defaults.clone(),
            defaults,
            created_at: now,
            modified_at: now,
            unsaved: false,
            columns: ColumnManager::new(),
            table: Table::new(kind),
            length: 0,
            cursor: 0,
            children: Vec::new(),
            parent: None,
            config,
            bus: NotificationBus::new(),
            metrics: CubeMetrics::new(),
            outbox: Vec::new(),
        };
        node.log(LogEvent::CubeCreated, &[("kind", node.kind.as_str())]);
        node
    }

    // ==================
    // Metadata
    // ==================

    pub fn id(&self) -> CubeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// External storage locator, if any
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn parameters(&self) -> &Attributes {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&AttrValue> {
        self.parameters.get(key)
    }

    /// Parameters supplied at creation
    pub fn defaults(&self) -> &Attributes {
        &self.defaults
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// True when the node changed since it was last saved or restored
    pub fn is_modified(&self) -> bool {
        self.unsaved
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }

    /// Metadata as carried by `metaUpdated`
    pub fn meta_snapshot(&self) -> MetaSnapshot {
        let parent = self
            .parent
            .as_ref()
            .and_then(WeakCube::upgrade)
            .and_then(|p| p.try_name());
        MetaSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            filename: self.filename.clone(),
            parameters: self.parameters.clone(),
            kind: self.kind,
            parent,
            modified_at: self.modified_at,
        }
    }

    // ==================
    // Rows
    // ==================

    /// Number of committed rows
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Current row index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Allocated rows, committed and staged
    pub fn capacity(&self) -> usize {
        self.table.rows()
    }

    /// Committed rows `0..len` in column order
    pub fn table(&self) -> Vec<Vec<Scalar>> {
        self.table.head(self.length)
    }

    /// The cursor row, staged or committed; `None` if not allocated yet
    pub fn row(&self) -> Option<Vec<Scalar>> {
        self.table.row(self.cursor)
    }

    /// A committed row
    pub fn row_at(&self, index: usize) -> CubeResult<Vec<Scalar>> {
        if index >= self.length {
            return Err(CubeError::out_of_range(index, self.length));
        }
        self.table
            .row(index)
            .ok_or_else(|| CubeError::out_of_range(index, self.capacity()))
    }

    /// One cell of any allocated row, including staged rows
    pub fn value(&self, column: &str, row: usize) -> CubeResult<Scalar> {
        let col = self.require_column(column)?;
        self.table
            .get(row, col)
            .ok_or_else(|| CubeError::out_of_range(row, self.capacity()))
    }

    // ==================
    // Columns
    // ==================

    /// Column names in display order
    pub fn names(&self) -> Vec<String> {
        self.columns.names().to_vec()
    }

    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn field_map(&self) -> &HashMap<String, usize> {
        self.columns.field_map()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.name_at(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.index_of(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Committed values of one column
    pub fn column(&self, name: &str) -> CubeResult<Vec<Scalar>> {
        let col = self.require_column(name)?;
        Ok(self.table.column(col, self.length))
    }

    /// Committed rows restricted to the given columns, in the given order
    pub fn columns(&self, names: &[&str]) -> CubeResult<Vec<Vec<Scalar>>> {
        let cols = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<CubeResult<Vec<_>>>()?;
        Ok((0..self.length)
            .map(|r| {
                cols.iter()
                    .map(|&c| self.table.get(r, c).unwrap_or_else(|| self.kind.zero()))
                    .collect()
            })
            .collect())
    }

    pub(super) fn require_column(&self, name: &str) -> CubeResult<usize> {
        self.columns
            .index_of(name)
            .ok_or_else(|| CubeError::unknown_column(name))
    }

    // ==================
    // Metadata mutations
    // ==================

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
        self.touch();
        self.emit(CubeEvent::Name(self.name.clone()));
        self.emit_meta();
    }

    pub(super) fn set_description(&mut self, description: String) {
        self.description = description;
        self.touch();
        self.emit(CubeEvent::Description(self.description.clone()));
        self.emit_meta();
    }

    pub(super) fn set_tags(&mut self, tags: String) {
        self.tags = tags;
        self.touch();
        self.emit(CubeEvent::Tags(self.tags.clone()));
        self.emit_meta();
    }

    pub(super) fn set_filename(&mut self, filename: PathBuf) {
        self.filename = Some(filename.clone());
        self.touch();
        self.emit(CubeEvent::Filename(filename));
        self.emit_meta();
    }

    pub(super) fn set_parameters(&mut self, parameters: Attributes) {
        self.parameters = parameters;
        self.touch();
        self.emit(CubeEvent::Parameters(self.parameters.clone()));
        self.emit_meta();
    }

    pub(super) fn add_parameters(&mut self, parameters: Attributes) {
        self.parameters.extend(parameters);
        self.touch();
        self.emit(CubeEvent::Parameters(self.parameters.clone()));
        self.emit_meta();
    }

    pub(super) fn set_parameter(&mut self, key: String, value: AttrValue) {
        self.parameters.insert(key, value);
        self.touch();
        self.emit(CubeEvent::Parameters(self.parameters.clone()));
    }

    pub(super) fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Drops columns, rows and child entries and resets parameters to the
    /// creation defaults. Emits `removeChild` per dropped child, then
    /// `names` and `metaUpdated`.
    pub(super) fn clear(&mut self) {
        self.columns = ColumnManager::new();
        self.table = Table::new(self.kind);
        self.length = 0;
        self.cursor = 0;
        self.parameters = self.defaults.clone();
        let detached = std::mem::take(&mut self.children);
        self.touch();
        for item in &detached {
            let entry = ChildRef::new(&item.cube);
            self.log(LogEvent::ChildDetached, &[("child", entry.name.as_str())]);
            self.emit(CubeEvent::RemoveChild(entry));
        }
        self.emit(CubeEvent::Names(Vec::new()));
        self.emit_meta();
    }

    // ==================
    // Internal helpers
    // ==================

    /// Updates the modification time and sets the unsaved flag
    pub(super) fn touch(&mut self) {
        self.modified_at = Utc::now();
        self.unsaved = true;
    }

    pub(super) fn emit(&mut self, event: CubeEvent) {
        self.outbox.push(event);
    }

    pub(super) fn emit_meta(&mut self) {
        let snapshot = self.meta_snapshot();
        self.emit(CubeEvent::MetaUpdated(Box::new(snapshot)));
    }

    pub(super) fn emit_names(&mut self) {
        self.emit(CubeEvent::Names(self.names()));
    }

    /// Realigns the buffer with the field list, growing it to `required_rows`
    pub(super) fn sync_columns(&mut self, required_rows: usize) -> Reconciled {
        let outcome = self.columns.reconcile(&mut self.table, required_rows);
        if outcome.rebuilt {
            self.metrics.increment_column_rebuilds();
            let cols = self.table.cols().to_string();
            let rows = self.table.rows().to_string();
            self.log(
                LogEvent::ColumnsRebuilt,
                &[("cols", cols.as_str()), ("rows", rows.as_str())],
            );
        }
        if outcome.resized {
            self.record_resize();
        }
        outcome
    }

    /// Makes `row` addressable, reserving the append margin when growing.
    /// Rows past what the buffer can address are out of range.
    pub(super) fn ensure_row(&mut self, row: usize) -> CubeResult<()> {
        self.sync_columns(0);
        match self.table.ensure_row(row, self.config.append_reserve) {
            Some(true) => self.record_resize(),
            Some(false) => {}
            None => {
                let limit = self.table.max_rows(self.table.cols());
                return Err(CubeError::out_of_range(row, limit));
            }
        }
        Ok(())
    }

    fn record_resize(&self) {
        self.metrics.increment_table_resizes();
        let rows = self.table.rows().to_string();
        self.log(LogEvent::TableResized, &[("rows", rows.as_str())]);
    }

    /// Logs `event` with the node name prepended to `fields`
    pub(super) fn log(&self, event: LogEvent, fields: &[(&str, &str)]) {
        let mut all = Vec::with_capacity(fields.len() + 1);
        all.push(("cube", self.name.as_str()));
        all.extend_from_slice(fields);
        log_event(event, &all);
    }
}
