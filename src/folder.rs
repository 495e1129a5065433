//! Source folder tree navigation.
//!
//! The source store exposes its calendars inside a folder hierarchy. The
//! collaborator snapshots that hierarchy into `FolderNode`s; walking and
//! path lookup happen here, decoupled from any printing or UI.

use serde::{Deserialize, Serialize};

/// One folder in the source store's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    /// The source's default item type code for the folder (appointments,
    /// mail, ...).
    pub item_type: i32,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Depth-first walk over the subtree rooted here, yielding each node
    /// with its depth. Lazy: nothing is visited until the iterator is
    /// driven.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &FolderNode)> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    /// Follow a path of folder names from this node's children.
    ///
    /// `find_path(&["Internet Calendars", "team@example.com"])` descends
    /// one level per name and returns the final folder, or `None` when any
    /// segment is missing.
    pub fn find_path(&self, path: &[&str]) -> Option<&FolderNode> {
        let mut current = self;
        for segment in path {
            current = current
                .children
                .iter()
                .find(|child| child.name == *segment)?;
        }
        Some(current)
    }
}

struct Walk<'a> {
    stack: Vec<(usize, &'a FolderNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a FolderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Reverse so the first child comes off the stack first.
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
