//! Snapshot export and whole-state restore
//!
//! A snapshot carries everything a persistence layer needs to rebuild a
//! node and its subtree: metadata, the field list and map, committed rows,
//! parameters and the children with their attributes.
//!
//! Restore is atomic for the node's own state: the snapshot is validated
//! and the new columns and buffer are built before anything is swapped in.
//! Children are restored one by one; a child that fails is skipped and
//! reported, its siblings and the parent are still loaded.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::columns::ColumnManager;
use crate::config::CubeConfig;
use crate::observability::{log_event, LogEvent};
use crate::storage::Table;
use crate::value::{AttrValue, Attributes, DataKind, Scalar};

use super::datacube::Datacube;
use super::errors::{CubeError, CubeResult};
use super::handle::Cube;
use super::hierarchy::{ChildItem, ROW_ATTRIBUTE};

/// Current snapshot layout version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

/// Serializable state of one node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSnapshot {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    pub kind: DataKind,
    pub field_names: Vec<String>,
    #[serde(default)]
    pub field_map: BTreeMap<String, usize>,
    /// Committed rows, one value per field
    #[serde(default)]
    pub rows: Vec<Vec<Scalar>>,
    #[serde(default)]
    pub parameters: Attributes,
    #[serde(default)]
    pub children: Vec<ChildSnapshot>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub filename: Option<PathBuf>,
    /// Cursor at capture time
    #[serde(default)]
    pub index: usize,
}

/// A child entry of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSnapshot {
    #[serde(default)]
    pub attributes: Attributes,
    pub cube: CubeSnapshot,
}

/// Outcome of [`Cube::restore_from`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub children_restored: usize,
    pub children_skipped: usize,
    /// `<child name>: <reason>` for every skipped child, depth first
    pub skipped: Vec<String>,
}

impl RestoreReport {
    fn absorb(&mut self, other: RestoreReport) {
        self.children_restored += other.children_restored;
        self.children_skipped += other.children_skipped;
        self.skipped.extend(other.skipped);
    }
}

impl CubeSnapshot {
    /// Checks the node's own state; children are checked when restored
    pub fn validate(&self) -> CubeResult<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(CubeError::invalid_snapshot(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }
        let mut seen = HashSet::new();
        for name in &self.field_names {
            if !seen.insert(name.as_str()) {
                return Err(CubeError::invalid_snapshot(format!(
                    "duplicate field name '{}'",
                    name
                )));
            }
        }
        if let Some((i, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.field_names.len())
        {
            return Err(CubeError::invalid_snapshot(format!(
                "row {} has {} values for {} fields",
                i,
                row.len(),
                self.field_names.len()
            )));
        }
        if self.index > self.rows.len() {
            return Err(CubeError::invalid_snapshot(format!(
                "index {} beyond length {}",
                self.index,
                self.rows.len()
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> CubeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CubeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Datacube {
    /// Captures the node and its subtree
    pub fn snapshot(&self) -> CubeSnapshot {
        CubeSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            kind: self.kind,
            field_names: self.names(),
            field_map: self
                .field_map()
                .iter()
                .map(|(name, index)| (name.clone(), *index))
                .collect(),
            rows: self.table(),
            parameters: self.parameters.clone(),
            children: self
                .children
                .iter()
                .map(|item| ChildSnapshot {
                    attributes: item.attributes.clone(),
                    cube: item.cube.read().snapshot(),
                })
                .collect(),
            created_at: self.created_at,
            modified_at: self.modified_at,
            filename: self.filename.clone(),
            index: self.cursor,
        }
    }
}

fn log_restore(cube: &str, event: LogEvent, fields: &[(&str, &str)]) {
    let mut all = vec![("cube", cube)];
    all.extend_from_slice(fields);
    log_event(event, &all);
}

/// Node state built from a snapshot, ready to be swapped in
struct Restored {
    columns: ColumnManager,
    table: Table,
    children: Vec<ChildItem>,
    report: RestoreReport,
}

impl Cube {
    /// Builds a new node (and subtree) from a snapshot
    pub fn from_snapshot(snapshot: &CubeSnapshot, config: CubeConfig) -> CubeResult<Cube> {
        Self::from_snapshot_report(snapshot, config).map(|(cube, _)| cube)
    }

    /// Replaces this node's state with `snapshot`.
    ///
    /// On error the node is unchanged. Children that fail to restore are
    /// skipped and listed in the report. Subscribers are kept and receive
    /// `names` then `metaUpdated`.
    pub fn restore_from(&self, snapshot: &CubeSnapshot) -> CubeResult<RestoreReport> {
        snapshot.validate()?;
        let (name, config) = {
            let node = self.read();
            (node.name.clone(), node.config.clone())
        };
        let rows = snapshot.rows.len().to_string();
        let children = snapshot.children.len().to_string();
        log_restore(
            &name,
            LogEvent::RestoreBegin,
            &[("children", children.as_str()), ("rows", rows.as_str())],
        );

        let restored = Self::build_restored(snapshot, &config, &name)?;
        let Restored {
            columns,
            table,
            children: new_children,
            report,
        } = restored;

        let old_children = self.read().children();
        for child in &old_children {
            child.link_parent(None);
        }
        for item in &new_children {
            item.cube.link_parent(Some(self));
        }

        self.mutate(|node| {
            node.name = snapshot.name.clone();
            node.description = snapshot.description.clone();
            node.tags = snapshot.tags.clone();
            node.kind = snapshot.kind;
            node.filename = snapshot.filename.clone();
            node.parameters = snapshot.parameters.clone();
            node.created_at = snapshot.created_at;
            node.modified_at = snapshot.modified_at;
            node.columns = columns;
            node.table = table;
            node.length = snapshot.rows.len();
            node.cursor = snapshot.index.min(node.length);
            node.children = new_children;
            node.unsaved = false;
            node.emit_names();
            node.emit_meta();
            Ok(())
        })?;

        let restored_count = report.children_restored.to_string();
        let skipped_count = report.children_skipped.to_string();
        log_restore(
            &name,
            LogEvent::RestoreComplete,
            &[
                ("restored", restored_count.as_str()),
                ("skipped", skipped_count.as_str()),
            ],
        );
        Ok(report)
    }

    fn build_restored(
        snapshot: &CubeSnapshot,
        config: &CubeConfig,
        name: &str,
    ) -> CubeResult<Restored> {
        let columns = ColumnManager::from_names(snapshot.field_names.clone())?;
        let table = Table::from_rows(snapshot.kind, &snapshot.rows, columns.len());

        let mut report = RestoreReport::default();
        let mut children = Vec::with_capacity(snapshot.children.len());
        for entry in &snapshot.children {
            match Self::from_snapshot_report(&entry.cube, config.clone()) {
                Ok((cube, child_report)) => {
                    report.children_restored += 1;
                    report.absorb(child_report);
                    // A child without an anchor row belongs to the restored cursor
                    let mut attributes = entry.attributes.clone();
                    attributes
                        .entry(ROW_ATTRIBUTE.to_string())
                        .or_insert_with(|| AttrValue::from(snapshot.index));
                    children.push(ChildItem { cube, attributes });
                }
                Err(err) => {
                    let reason = err.to_string();
                    log_restore(
                        name,
                        LogEvent::RestoreChildSkipped,
                        &[("child", entry.cube.name.as_str()), ("error", reason.as_str())],
                    );
                    report.children_skipped += 1;
                    report.skipped.push(format!("{}: {}", entry.cube.name, reason));
                }
            }
        }
        Ok(Restored {
            columns,
            table,
            children,
            report,
        })
    }

    fn from_snapshot_report(
        snapshot: &CubeSnapshot,
        config: CubeConfig,
    ) -> CubeResult<(Cube, RestoreReport)> {
        let cube = Cube::builder(snapshot.name.clone())
            .kind(snapshot.kind)
            .config(config)
            .build();
        let report = cube.restore_from(snapshot)?;
        Ok((cube, report))
    }
}
