//! Tree traversal and aggregation
//!
//! Depth 0 is the node itself, depth 1 its children, and so on.

use std::fmt::Write as _;

use crate::value::Scalar;

use super::datacube::Datacube;
use super::errors::CubeResult;
use super::handle::Cube;
use super::hierarchy::ROW_ATTRIBUTE;
use super::rows::SetOptions;

/// Column names of a node and of its descendants, shaped like the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTree {
    pub names: Vec<String>,
    pub children: Vec<NameTree>,
}

/// Node names shaped like the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyTree {
    pub name: String,
    pub children: Vec<FamilyTree>,
}

impl Datacube {
    /// Length of the longest branch below this node
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(|item| 1 + item.cube.read().max_depth())
            .max()
            .unwrap_or(0)
    }

    /// Depth of the shallowest leaf, i.e. the deepest level every branch
    /// reaches
    pub fn common_depth(&self) -> usize {
        let mut depth = 0;
        let mut level = self.children();
        while !level.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for cube in &level {
                let children = cube.read().children();
                if children.is_empty() {
                    return depth;
                }
                next.extend(children);
            }
            level = next;
        }
        depth
    }

    /// Negative levels count back from one past the common depth
    fn resolve_level(&self, level: isize) -> usize {
        if level < 0 {
            (self.common_depth() as isize + 1 + level).max(0) as usize
        } else {
            level as usize
        }
    }

    /// Own column names followed by those of descendants down to `level`,
    /// each name once, in first-seen order
    pub fn names_up_to(&self, level: isize) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(self.resolve_level(level), &mut out);
        out
    }

    fn collect_names(&self, level: usize, out: &mut Vec<String>) {
        for name in self.columns.names() {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        if level == 0 {
            return;
        }
        for item in &self.children {
            item.cube.read().collect_names(level - 1, out);
        }
    }

    /// Column names down to `level`, keeping the tree shape
    pub fn name_tree(&self, level: isize) -> NameTree {
        self.build_name_tree(self.resolve_level(level))
    }

    fn build_name_tree(&self, level: usize) -> NameTree {
        let children = if level == 0 {
            Vec::new()
        } else {
            self.children
                .iter()
                .map(|item| item.cube.read().build_name_tree(level - 1))
                .collect()
        };
        NameTree {
            names: self.names(),
            children,
        }
    }

    /// Own names, then per level the names shared by every node of that
    /// level, in first-child order. Stops before the first level without
    /// shared names.
    pub fn common_names(&self) -> Vec<Vec<String>> {
        let mut out = vec![self.names()];
        let mut level = self.children();
        while !level.is_empty() {
            let mut shared = level[0].read().names();
            let mut next = Vec::new();
            let mut every_branch_continues = true;
            for cube in &level {
                let node = cube.read();
                shared.retain(|name| node.has_column(name));
                let children = node.children();
                every_branch_continues &= !children.is_empty();
                next.extend(children);
            }
            if shared.is_empty() {
                break;
            }
            out.push(shared);
            if !every_branch_continues {
                break;
            }
            level = next;
        }
        out
    }

    /// Indented text outline: `cube(<len>,<cols>)` per node, each child
    /// preceded by its attributes
    pub fn structure(&self) -> String {
        let mut out = String::new();
        self.write_structure("", &mut out);
        out
    }

    fn write_structure(&self, tabs: &str, out: &mut String) {
        let _ = writeln!(out, "{}cube({},{})", tabs, self.length, self.columns.len());
        let deeper = format!("{}\t", tabs);
        for item in &self.children {
            let parts: Vec<String> = item
                .attributes
                .iter()
                .map(|(key, value)| format!(" {} = {}", key, value))
                .collect();
            let _ = writeln!(out, "{}:", parts.join(", "));
            item.cube.read().write_structure(&deeper, out);
        }
    }
}

impl Cube {
    /// Nodes at depth `level`, breadth first. With `require_all`, empty
    /// unless every branch reaches that depth.
    pub fn cubes_at_level(&self, level: usize, require_all: bool) -> Vec<Cube> {
        let mut depth = 0;
        let mut cubes = vec![self.clone()];
        while depth < level {
            let mut next = Vec::new();
            for cube in &cubes {
                let children = cube.read().children();
                if children.is_empty() && require_all {
                    return Vec::new();
                }
                next.extend(children);
            }
            if next.is_empty() {
                break;
            }
            cubes = next;
            depth += 1;
        }
        if depth == level {
            cubes
        } else {
            Vec::new()
        }
    }

    /// This node and all descendants, depth first, parents before children
    pub fn family_members(&self) -> Vec<Cube> {
        let mut out = vec![self.clone()];
        let children = self.read().children();
        for child in &children {
            out.extend(child.family_members());
        }
        out
    }

    /// Node names shaped like the tree
    pub fn tree_names(&self) -> FamilyTree {
        let (name, children) = {
            let node = self.read();
            (node.name.clone(), node.children())
        };
        FamilyTree {
            name,
            children: children.iter().map(Cube::tree_names).collect(),
        }
    }

    /// One flat node holding, for every child row, the child's `row`
    /// anchor, the anchored parent row and the child row itself.
    ///
    /// The result is named `<name>_Flat` and shares kind and config with
    /// this node. Children without a committed anchor row get zeros for
    /// the parent columns.
    pub fn flatten(&self) -> CubeResult<Cube> {
        let node = self.read();
        let flat = Cube::builder(format!("{}_Flat", node.name))
            .kind(node.kind)
            .config(node.config.clone())
            .build();
        let parent_names = node.names();

        for item in &node.children {
            let anchor = item.row();
            let parent_values = anchor
                .and_then(|r| node.row_at(r).ok())
                .unwrap_or_else(|| vec![node.kind.zero(); parent_names.len()]);

            let child = item.cube.read();
            let child_names = child.names();
            let mut order = vec![ROW_ATTRIBUTE.to_string()];
            order.extend(parent_names.iter().cloned());
            order.extend(child_names.iter().cloned());

            for r in 0..child.len() {
                let mut values: Vec<(String, Scalar)> = Vec::with_capacity(order.len());
                values.push((
                    ROW_ATTRIBUTE.to_string(),
                    Scalar::Int(anchor.unwrap_or(0) as i64),
                ));
                values.extend(parent_names.iter().cloned().zip(parent_values.iter().copied()));
                values.extend(child_names.iter().cloned().zip(child.row_at(r)?));
                let options = SetOptions {
                    column_order: order.clone(),
                    commit: true,
                    ..SetOptions::default()
                };
                flat.set_with(options, values)?;
            }
        }
        Ok(flat)
    }
}
