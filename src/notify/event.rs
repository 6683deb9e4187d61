//! # Cube Events
//!
//! Change notifications emitted by a datacube node.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::cube::{Cube, CubeId};
use crate::value::{Attributes, DataKind};

/// The child of an attach/detach event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub id: CubeId,
    pub name: String,
    pub cube: Cube,
}

impl ChildRef {
    pub fn new(cube: &Cube) -> Self {
        Self {
            id: cube.id(),
            name: cube.name(),
            cube: cube.clone(),
        }
    }
}

/// Metadata of a node at the time of a `metaUpdated` event
#[derive(Debug, Clone, PartialEq)]
pub struct MetaSnapshot {
    pub name: String,
    pub description: String,
    pub tags: String,
    pub filename: Option<PathBuf>,
    pub parameters: Attributes,
    pub kind: DataKind,
    /// Name of the parent, if attached
    pub parent: Option<String>,
    pub modified_at: DateTime<Utc>,
}

/// Kind of a [`CubeEvent`], without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Name,
    Description,
    Tags,
    Filename,
    Parameters,
    MetaUpdated,
    Names,
    Commit,
    ClearRow,
    SortBy,
    AddChild,
    RemoveChild,
}

impl EventKind {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Name => "name",
            EventKind::Description => "description",
            EventKind::Tags => "tags",
            EventKind::Filename => "filename",
            EventKind::Parameters => "parameters",
            EventKind::MetaUpdated => "metaUpdated",
            EventKind::Names => "names",
            EventKind::Commit => "commit",
            EventKind::ClearRow => "clearRow",
            EventKind::SortBy => "sortBy",
            EventKind::AddChild => "addChild",
            EventKind::RemoveChild => "removeChild",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A change notification with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum CubeEvent {
    Name(String),
    Description(String),
    Tags(String),
    Filename(PathBuf),
    /// Full parameter map after the change
    Parameters(Attributes),
    MetaUpdated(Box<MetaSnapshot>),
    /// Column names after a structural change
    Names(Vec<String>),
    /// A row was committed, inserted or removed at this index
    Commit { row: usize },
    ClearRow,
    /// Column the rows were sorted by
    SortBy(String),
    AddChild(ChildRef),
    RemoveChild(ChildRef),
}

impl CubeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CubeEvent::Name(_) => EventKind::Name,
            CubeEvent::Description(_) => EventKind::Description,
            CubeEvent::Tags(_) => EventKind::Tags,
            CubeEvent::Filename(_) => EventKind::Filename,
            CubeEvent::Parameters(_) => EventKind::Parameters,
            CubeEvent::MetaUpdated(_) => EventKind::MetaUpdated,
            CubeEvent::Names(_) => EventKind::Names,
            CubeEvent::Commit { .. } => EventKind::Commit,
            CubeEvent::ClearRow => EventKind::ClearRow,
            CubeEvent::SortBy(_) => EventKind::SortBy,
            CubeEvent::AddChild(_) => EventKind::AddChild,
            CubeEvent::RemoveChild(_) => EventKind::RemoveChild,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl fmt::Display for CubeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeEvent::Name(v) | CubeEvent::Description(v) | CubeEvent::Tags(v) => {
                write!(f, "{}({})", self.as_str(), v)
            }
            CubeEvent::Filename(p) => write!(f, "filename({})", p.display()),
            CubeEvent::Parameters(p) => write!(f, "parameters({} keys)", p.len()),
            CubeEvent::MetaUpdated(m) => write!(f, "metaUpdated({})", m.name),
            CubeEvent::Names(n) => write!(f, "names({})", n.join(",")),
            CubeEvent::Commit { row } => write!(f, "commit({})", row),
            CubeEvent::ClearRow => write!(f, "clearRow"),
            CubeEvent::SortBy(c) => write!(f, "sortBy({})", c),
            CubeEvent::AddChild(c) | CubeEvent::RemoveChild(c) => {
                write!(f, "{}({})", self.as_str(), c.name)
            }
        }
    }
}
