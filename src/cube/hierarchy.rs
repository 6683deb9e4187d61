//! Parent/child links between datacube nodes
//!
//! A parent owns its children through [`ChildItem`] entries; a child points
//! back through a weak handle. A node has at most one parent, and attaching
//! it elsewhere detaches it first. Attaching a node under one of its own
//! descendants is rejected.

use std::collections::BTreeSet;

use crate::notify::{ChildRef, CubeEvent};
use crate::observability::LogEvent;
use crate::value::{AttrValue, Attributes};

use super::datacube::Datacube;
use super::errors::{CubeError, CubeResult};
use super::handle::Cube;

/// Attribute anchoring a child to a row of its parent
pub const ROW_ATTRIBUTE: &str = "row";

/// A child node together with its attribute map
#[derive(Debug, Clone)]
pub struct ChildItem {
    pub(super) cube: Cube,
    pub(super) attributes: Attributes,
}

impl ChildItem {
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Parent row this child is anchored to
    pub fn row(&self) -> Option<usize> {
        self.attributes
            .get(ROW_ATTRIBUTE)
            .and_then(AttrValue::as_row)
    }

    fn matches(&self, filter: &Attributes) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.attributes.get(key) == Some(value))
    }
}

/// Records the first error of a multi-step operation and lets it continue
fn keep_first(first: &mut Option<CubeError>, result: CubeResult<()>) {
    if let Err(err) = result {
        first.get_or_insert(err);
    }
}

fn first_or_ok(first: Option<CubeError>) -> CubeResult<()> {
    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ==================
// Reads
// ==================

impl Datacube {
    /// The parent node, if attached and still alive
    pub fn parent(&self) -> Option<Cube> {
        self.parent.as_ref().and_then(|p| p.upgrade())
    }

    /// Direct children in attachment order
    pub fn children(&self) -> Vec<Cube> {
        self.children.iter().map(|item| item.cube.clone()).collect()
    }

    pub fn child_items(&self) -> &[ChildItem] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_child(&self, child: &Cube) -> bool {
        self.position_of(child).is_some()
    }

    pub(super) fn position_of(&self, child: &Cube) -> Option<usize> {
        self.children.iter().position(|item| item.cube.ptr_eq(child))
    }

    /// Children whose attributes contain every pair of `filter`, in
    /// attachment order. An empty filter returns every child.
    pub fn children_where(&self, filter: &Attributes) -> Vec<Cube> {
        self.children
            .iter()
            .filter(|item| item.matches(filter))
            .map(|item| item.cube.clone())
            .collect()
    }

    /// Children anchored to parent row `row`
    pub fn children_at(&self, row: usize) -> Vec<Cube> {
        let mut filter = Attributes::new();
        filter.insert(ROW_ATTRIBUTE.to_string(), AttrValue::from(row));
        self.children_where(&filter)
    }

    /// A copy of the attribute map of `child`
    pub fn attributes_of(&self, child: &Cube) -> CubeResult<Attributes> {
        self.position_of(child)
            .map(|i| self.children[i].attributes.clone())
            .ok_or_else(|| CubeError::ChildNotFound(child.name()))
    }

    /// Attribute keys over all children, sorted. With `common`, only the
    /// keys every child carries.
    pub fn child_attribute_keys(&self, common: bool) -> Vec<String> {
        let mut keys: Option<BTreeSet<String>> = None;
        for item in &self.children {
            let own: BTreeSet<String> = item.attributes.keys().cloned().collect();
            keys = Some(match keys {
                None => own,
                Some(acc) if common => acc.intersection(&own).cloned().collect(),
                Some(mut acc) => {
                    acc.extend(own);
                    acc
                }
            });
        }
        keys.map(|k| k.into_iter().collect::<Vec<_>>())
            .unwrap_or_default()
    }
}

// ==================
// Attach / detach
// ==================

impl Cube {
    /// Attaches `child` with the given attributes.
    ///
    /// `row` defaults to this node's cursor. A child attached elsewhere is
    /// detached from its previous parent first. Fails with
    /// `InvalidHierarchy` on self-attach, on a child that is already
    /// attached here, and on a child that is an ancestor of this node.
    pub fn add_child(&self, child: &Cube, attributes: Attributes) -> CubeResult<()> {
        if self.ptr_eq(child) {
            return Err(CubeError::invalid_hierarchy(format!(
                "cannot attach '{}' to itself",
                self.name()
            )));
        }
        if self.read().has_child(child) {
            return Err(CubeError::invalid_hierarchy(format!(
                "'{}' is already a child of '{}'",
                child.name(),
                self.name()
            )));
        }
        if self.has_ancestor(child) {
            return Err(CubeError::invalid_hierarchy(format!(
                "attaching '{}' under '{}' would create a cycle",
                child.name(),
                self.name()
            )));
        }

        let mut first = None;
        let previous = child.read().parent();
        if let Some(previous) = previous {
            keep_first(&mut first, previous.remove_child(child, false).map(|_| ()));
        }
        keep_first(&mut first, child.set_parent(Some(self)));

        let entry = ChildRef::new(child);
        let mut attributes = attributes;
        let attached = child.clone();
        keep_first(
            &mut first,
            self.mutate(move |node| {
                attributes
                    .entry(ROW_ATTRIBUTE.to_string())
                    .or_insert_with(|| AttrValue::from(node.cursor));
                node.children.push(ChildItem {
                    cube: attached,
                    attributes,
                });
                node.touch();
                node.log(LogEvent::ChildAttached, &[("child", entry.name.as_str())]);
                node.emit(CubeEvent::AddChild(entry));
                Ok(())
            }),
        );
        first_or_ok(first)
    }

    /// Detaches `child`; with `delete_subtree`, detaches its descendants
    /// first. Returns `Ok(false)` when `child` is not attached here.
    pub fn remove_child(&self, child: &Cube, delete_subtree: bool) -> CubeResult<bool> {
        if !self.read().has_child(child) {
            return Ok(false);
        }

        let mut first = None;
        if delete_subtree {
            let grandchildren = child.read().children();
            for grandchild in &grandchildren {
                keep_first(
                    &mut first,
                    child.remove_child(grandchild, true).map(|_| ()),
                );
            }
        }

        let entry = ChildRef::new(child);
        let removed = self.mutate(|node| {
            let Some(position) = node.position_of(child) else {
                return Ok(false);
            };
            node.children.remove(position);
            node.touch();
            node.log(LogEvent::ChildDetached, &[("child", entry.name.as_str())]);
            node.emit(CubeEvent::RemoveChild(entry));
            Ok(true)
        });
        let removed = match removed {
            Ok(removed) => removed,
            Err(err) => {
                first.get_or_insert(err);
                true
            }
        };
        if removed && child.read().parent().is_some_and(|p| p.ptr_eq(self)) {
            keep_first(&mut first, child.set_parent(None));
        }
        first_or_ok(first).map(|_| removed)
    }

    /// Detaches every listed child that is attached here; returns how many
    pub fn remove_children(&self, children: &[Cube], delete_subtree: bool) -> CubeResult<usize> {
        let mut first = None;
        let mut removed = 0;
        for child in children {
            match self.remove_child(child, delete_subtree) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(err) => {
                    removed += 1;
                    first.get_or_insert(err);
                }
            }
        }
        first_or_ok(first).map(|_| removed)
    }

    /// Merges `attributes` into the attribute map of `child`
    pub fn set_child_attributes(&self, child: &Cube, attributes: Attributes) -> CubeResult<()> {
        let name = child.name();
        self.mutate(|node| {
            let position = node
                .position_of(child)
                .ok_or_else(|| CubeError::ChildNotFound(name))?;
            node.children[position].attributes.extend(attributes);
            node.touch();
            Ok(())
        })
    }

    /// Drops columns, rows and parameters and detaches every child.
    ///
    /// Name, kind, config and subscribers survive.
    pub fn clear(&self) -> CubeResult<()> {
        let detached = self.read().children();
        let mut first = None;
        keep_first(
            &mut first,
            self.mutate(|node| {
                node.clear();
                Ok(())
            }),
        );
        for child in &detached {
            keep_first(&mut first, child.set_parent(None));
        }
        first_or_ok(first)
    }

    /// True when `candidate` is a strict ancestor of this node
    pub fn has_ancestor(&self, candidate: &Cube) -> bool {
        let mut current = self.read().parent();
        while let Some(node) = current {
            if node.ptr_eq(candidate) {
                return true;
            }
            current = node.read().parent();
        }
        false
    }

    /// Updates the parent back-reference and emits `metaUpdated`
    fn set_parent(&self, parent: Option<&Cube>) -> CubeResult<()> {
        let link = parent.map(Cube::downgrade);
        self.mutate(|node| {
            node.parent = link;
            node.emit_meta();
            Ok(())
        })
    }
}
