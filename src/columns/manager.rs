//! Ordered field list, name map and the data-preserving rebuild

use std::collections::HashMap;
use std::fmt;

use crate::cube::{CubeError, CubeResult};
use crate::storage::Table;

/// Prefix of auto-generated column names
pub const AUTO_NAME_PREFIX: &str = "New_";

/// A column addressed by name or by position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(n) => write!(f, "{}", n),
            ColumnRef::Index(i) => write!(f, "#{}", i),
        }
    }
}

/// Result of [`ColumnManager::add_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: String,
    pub index: usize,
    /// False when the name already existed
    pub created: bool,
}

/// What [`ColumnManager::reconcile`] had to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// The buffer was rebuilt because the field list changed
    pub rebuilt: bool,
    /// The buffer only grew in rows
    pub resized: bool,
}

/// Ordered column names and their name -> index inverse
///
/// Edits touch the field list only. The map keeps describing the current
/// buffer layout until [`reconcile`](Self::reconcile) realigns the buffer
/// with the list and regenerates the map from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnManager {
    names: Vec<String>,
    map: HashMap<String, usize>,
}

impl ColumnManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager from a field list. Duplicate names are rejected.
    pub fn from_names(names: Vec<String>) -> CubeResult<Self> {
        let mut manager = Self {
            names,
            map: HashMap::new(),
        };
        manager.refresh_map();
        if manager.map.len() != manager.names.len() {
            let dup = manager
                .names
                .iter()
                .enumerate()
                .find(|(i, n)| manager.map.get(*n) != Some(i))
                .map(|(_, n)| n.clone())
                .unwrap_or_default();
            return Err(CubeError::DuplicateColumn(dup));
        }
        Ok(manager)
    }

    /// Column names in display order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn field_map(&self) -> &HashMap<String, usize> {
        &self.map
    }

    /// Buffer column of `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// True when the map is the exact inverse of the field list
    pub fn is_consistent(&self) -> bool {
        self.names.len() == self.map.len()
            && self
                .names
                .iter()
                .enumerate()
                .all(|(i, n)| self.map.get(n) == Some(&i))
    }

    /// First free `New_<n>` name for n in `1..=max_attempts`
    pub fn generate_name(&self, max_attempts: usize) -> CubeResult<String> {
        (1..=max_attempts)
            .map(|n| format!("{}{}", AUTO_NAME_PREFIX, n))
            .find(|candidate| !self.contains(candidate))
            .ok_or(CubeError::ColumnNameExhausted(max_attempts))
    }

    /// Inserts `name` into the field list unless it is already there.
    ///
    /// `desired` resolves negative positions from the end as
    /// `count + desired + 1` (clamped to 0); missing or too large positions
    /// append. An unset name is auto-generated.
    pub fn add_field(
        &mut self,
        name: Option<&str>,
        desired: Option<isize>,
        max_attempts: usize,
    ) -> CubeResult<FieldSlot> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.generate_name(max_attempts)?,
        };
        if let Some(index) = self.names.iter().position(|n| *n == name) {
            return Ok(FieldSlot {
                name,
                index,
                created: false,
            });
        }

        let count = self.names.len();
        let index = match desired {
            Some(d) if d < 0 => (count as isize + d + 1).max(0) as usize,
            Some(d) if (d as usize) <= count => d as usize,
            _ => count,
        };
        self.names.insert(index, name.clone());
        Ok(FieldSlot {
            name,
            index,
            created: true,
        })
    }

    /// Renames a column in place; the data stays where it is.
    ///
    /// Returns `None` when `old` does not exist, otherwise the new name
    /// (auto-generated if `new` is unset).
    pub fn rename(
        &mut self,
        old: &str,
        new: Option<&str>,
        max_attempts: usize,
    ) -> CubeResult<Option<String>> {
        let Some(pos) = self.names.iter().position(|n| n == old) else {
            return Ok(None);
        };
        let new = match new {
            Some(n) if n == old => return Ok(Some(old.to_string())),
            Some(n) if self.contains(n) => return Err(CubeError::DuplicateColumn(n.to_string())),
            Some(n) => n.to_string(),
            None => self.generate_name(max_attempts)?,
        };
        self.names[pos] = new.clone();
        if let Some(col) = self.map.remove(old) {
            self.map.insert(new.clone(), col);
        }
        Ok(Some(new))
    }

    /// Drops the referenced columns from the field list.
    ///
    /// Indices refer to positions before any removal. Unknown names and
    /// indices are ignored. Returns the names removed.
    pub fn remove(&mut self, targets: &[ColumnRef]) -> Vec<String> {
        let mut doomed: Vec<String> = Vec::new();
        for target in targets {
            let name = match target {
                ColumnRef::Name(n) if self.contains(n) => n.clone(),
                ColumnRef::Index(i) if *i < self.names.len() => self.names[*i].clone(),
                _ => continue,
            };
            if !doomed.contains(&name) {
                doomed.push(name);
            }
        }
        self.names.retain(|n| !doomed.contains(n));
        doomed
    }

    /// Realigns `table` with the field list and regenerates the map.
    ///
    /// When list and map disagree, a new buffer of
    /// `max(previous rows, required_rows) x names` is built, every column
    /// whose name existed before is copied whole into its new position and
    /// new columns are zero-filled. Otherwise the buffer only grows to
    /// `required_rows` if it is shorter.
    pub fn reconcile(&mut self, table: &mut Table, required_rows: usize) -> Reconciled {
        let mut outcome = Reconciled::default();
        if self.is_consistent() && table.cols() == self.names.len() {
            if table.rows() < required_rows {
                table.resize(required_rows, self.names.len());
                outcome.resized = true;
            }
        } else {
            let mapping: Vec<Option<usize>> = self
                .names
                .iter()
                .map(|n| self.map.get(n).copied())
                .collect();
            let rows = table.rows().max(required_rows);
            *table = table.remap_columns(&mapping, rows);
            outcome.rebuilt = true;
        }
        self.refresh_map();
        outcome
    }

    /// Regenerates the map from the field list
    fn refresh_map(&mut self) {
        self.map = self
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
    }
}
