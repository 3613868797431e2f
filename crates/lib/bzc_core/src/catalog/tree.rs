//! Category tree construction and flattening.
//!
//! Builds a forest of nested nodes from a flat parent-pointer list, and
//! flattens a forest into a depth-annotated pre-order sequence for
//! indented rendering (navigation menus, admin tables, select inputs).
//!
//! Both operations are pure: no I/O, no shared state, deterministic for
//! a given input.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::debug;

/// A record that can participate in a parent-pointer tree.
pub trait TreeRecord {
    /// Identifier type. Identifiers are unique within one input set.
    type Id: Eq + Hash + Clone + Debug;

    /// The record's own identifier.
    fn id(&self) -> Self::Id;

    /// The parent identifier; `None` marks a root.
    fn parent_id(&self) -> Option<Self::Id>;
}

/// A record plus its ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub record: T,
    pub children: Vec<TreeNode<T>>,
}

/// A record annotated with its depth in the forest (roots are depth 0).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry<T> {
    pub record: T,
    pub depth: usize,
}

/// What to do with a record whose declared parent is absent from the
/// input set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Treat the orphan as a root. This is the storefront's historical
    /// behavior and the default.
    #[default]
    PromoteToRoot,
    /// Drop the orphan and its subtree from the output.
    Drop,
    /// Fail with [`TreeError::Orphan`] naming the first orphan found.
    Error,
}

/// Tree construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A record references a parent that is not in the input set, under
    /// [`OrphanPolicy::Error`].
    #[error("record {id} references missing parent {parent_id}")]
    Orphan { id: String, parent_id: String },
}

/// Build a forest from a flat record list, promoting orphans to roots.
///
/// Root and sibling order follows first-seen input order. Duplicate
/// identifiers overwrite: the last record wins, keeping the first-seen
/// position.
pub fn build_tree<T: TreeRecord>(records: Vec<T>) -> Vec<TreeNode<T>> {
    // PromoteToRoot never fails.
    match build_tree_with(records, OrphanPolicy::PromoteToRoot) {
        Ok(forest) => forest,
        Err(_) => Vec::new(),
    }
}

/// Build a forest from a flat record list with an explicit orphan policy.
///
/// Records that form a parent cycle are unreachable from any root and are
/// omitted from the output; the input contract is acyclic.
pub fn build_tree_with<T: TreeRecord>(
    records: Vec<T>,
    policy: OrphanPolicy,
) -> Result<Vec<TreeNode<T>>, TreeError> {
    let mut slots: Vec<Option<T>> = Vec::with_capacity(records.len());
    let mut index: HashMap<T::Id, usize> = HashMap::with_capacity(records.len());

    for record in records {
        match index.get(&record.id()) {
            // Duplicate id: last write wins, first-seen position kept.
            Some(&i) => slots[i] = Some(record),
            None => {
                index.insert(record.id(), slots.len());
                slots.push(Some(record));
            }
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut roots: Vec<usize> = Vec::new();

    for i in 0..slots.len() {
        let Some(record) = slots[i].as_ref() else {
            continue;
        };
        match record.parent_id() {
            None => roots.push(i),
            Some(parent_id) => match index.get(&parent_id) {
                // A record cannot parent itself; treat that as an orphan.
                Some(&p) if p != i => children[p].push(i),
                _ => match policy {
                    OrphanPolicy::PromoteToRoot => {
                        debug!("promoting orphan {:?} to root", record.id());
                        roots.push(i);
                    }
                    OrphanPolicy::Drop => {
                        debug!("dropping orphan {:?}", record.id());
                        slots[i] = None;
                    }
                    OrphanPolicy::Error => {
                        return Err(TreeError::Orphan {
                            id: format!("{:?}", record.id()),
                            parent_id: format!("{parent_id:?}"),
                        });
                    }
                },
            },
        }
    }

    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        if let Some(node) = assemble(root, &mut slots, &children) {
            forest.push(node);
        }
    }
    Ok(forest)
}

/// Move the record at `i` and its descendants out of `slots` into a node.
fn assemble<T>(i: usize, slots: &mut [Option<T>], children: &[Vec<usize>]) -> Option<TreeNode<T>> {
    let record = slots[i].take()?;
    let mut node = TreeNode {
        record,
        children: Vec::with_capacity(children[i].len()),
    };
    for &child in &children[i] {
        if let Some(child_node) = assemble(child, slots, children) {
            node.children.push(child_node);
        }
    }
    Some(node)
}

/// Flatten a forest into a depth-annotated pre-order sequence, roots at
/// depth 0.
pub fn flatten_tree<T>(nodes: Vec<TreeNode<T>>) -> Vec<FlatEntry<T>> {
    flatten_tree_from(nodes, 0)
}

/// Flatten a forest starting at `depth`. Each node is emitted before its
/// children; siblings keep their order.
pub fn flatten_tree_from<T>(nodes: Vec<TreeNode<T>>, depth: usize) -> Vec<FlatEntry<T>> {
    let mut out = Vec::new();
    for node in nodes {
        walk(node, depth, &mut out);
    }
    out
}

fn walk<T>(node: TreeNode<T>, depth: usize, out: &mut Vec<FlatEntry<T>>) {
    out.push(FlatEntry {
        record: node.record,
        depth,
    });
    for child in node.children {
        walk(child, depth + 1, out);
    }
}
