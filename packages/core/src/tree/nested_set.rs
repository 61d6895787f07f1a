//! In-memory nested-set algebra for one scoped tree
//!
//! The service layer loads every entry of a scope under a write lock, runs one
//! of the mutations below, checks the result with [`NestedSet::verify`] and
//! writes back only the rows listed in the returned [`BoundsChange`]s.
//!
//! Moves use the classic boundary-swap arithmetic: the moved subtree occupies
//! one contiguous interval and the nodes between it and its destination occupy
//! another; the two intervals trade places and everything else is untouched.
//!
//! ```text
//!  before:  [a ........ b][c .......... d]      (one of the two is the subtree)
//!  after:   [c .......... d][a ........ b]
//! ```

use crate::models::{Bounds, Page, Scope};
use crate::services::error::PageTreeError;
use std::collections::HashMap;

/// Structural part of a page: identity, parent and bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub id: String,
    pub parent_id: Option<String>,
    pub bounds: Bounds,
}

impl From<&Page> for TreeEntry {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            parent_id: page.parent_id.clone(),
            bounds: Bounds::new(page.left, page.right, page.depth),
        }
    }
}

/// New parent and bounds for one row that has to be rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsChange {
    pub id: String,
    pub parent_id: Option<String>,
    pub bounds: Bounds,
}

/// Destination of a move, relative to a target page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePosition {
    /// Immediately before the target, as its sibling
    Left,
    /// Immediately after the target, as its sibling
    Right,
    /// First child of the target
    FirstChild,
    /// Last child of the target
    LastChild,
}

impl MovePosition {
    fn makes_child(self) -> bool {
        matches!(self, Self::FirstChild | Self::LastChild)
    }
}

/// Result of removing a subtree
#[derive(Debug, Clone, Default)]
pub struct Removal {
    /// Ids of the removed pages, in `left` order
    pub removed: Vec<String>,
    /// Rows whose bounds closed the gap
    pub shifted: Vec<BoundsChange>,
}

/// All entries of one scope, kept sorted by `left`
#[derive(Debug, Clone)]
pub struct NestedSet {
    scope: Scope,
    entries: Vec<TreeEntry>,
    index: HashMap<String, usize>,
}

impl NestedSet {
    /// Build from the entries of one scope (any order)
    pub fn new(scope: Scope, mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by_key(|e| e.bounds.left);
        let index = Self::build_index(&entries);
        Self {
            scope,
            entries,
            index,
        }
    }

    fn build_index(entries: &[TreeEntry]) -> HashMap<String, usize> {
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in `left` order
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&TreeEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn root(&self) -> Option<&TreeEntry> {
        self.entries.first().filter(|e| e.parent_id.is_none())
    }

    fn require(&self, id: &str) -> Result<TreeEntry, PageTreeError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| PageTreeError::page_not_found(id))
    }

    /// Rewrite every entry through `f` and keep the ones that changed
    fn rewrite<F>(&mut self, f: F) -> Vec<BoundsChange>
    where
        F: Fn(&TreeEntry) -> (Option<String>, Bounds),
    {
        let mut changes = Vec::new();
        for entry in &mut self.entries {
            let (parent_id, bounds) = f(entry);
            if parent_id != entry.parent_id || bounds != entry.bounds {
                entry.parent_id = parent_id.clone();
                entry.bounds = bounds;
                changes.push(BoundsChange {
                    id: entry.id.clone(),
                    parent_id,
                    bounds,
                });
            }
        }
        self.entries.sort_by_key(|e| e.bounds.left);
        self.index = Self::build_index(&self.entries);
        changes
    }

    /// Place the first page of an empty scope
    ///
    /// # Errors
    ///
    /// `RootConflict` if the scope already holds a tree.
    pub fn insert_root(&mut self, id: impl Into<String>) -> Result<TreeEntry, PageTreeError> {
        if !self.is_empty() {
            return Err(PageTreeError::root_conflict(self.scope.clone()));
        }

        let entry = TreeEntry {
            id: id.into(),
            parent_id: None,
            bounds: Bounds::new(1, 2, 0),
        };
        self.entries.push(entry.clone());
        self.index = Self::build_index(&self.entries);
        Ok(entry)
    }

    /// Append a new leaf as the last child of `parent_id`
    ///
    /// Returns the new entry and the shifted rows (ancestors and every node to
    /// the right of the insertion point).
    pub fn insert_last_child(
        &mut self,
        parent_id: &str,
        id: impl Into<String>,
    ) -> Result<(TreeEntry, Vec<BoundsChange>), PageTreeError> {
        let parent = self.require(parent_id)?;
        let at = parent.bounds.right;

        let shifted = self.rewrite(|e| {
            let left = if e.bounds.left >= at { e.bounds.left + 2 } else { e.bounds.left };
            let right = if e.bounds.right >= at { e.bounds.right + 2 } else { e.bounds.right };
            (e.parent_id.clone(), Bounds::new(left, right, e.bounds.depth))
        });

        let entry = TreeEntry {
            id: id.into(),
            parent_id: Some(parent.id),
            bounds: Bounds::new(at, at + 1, parent.bounds.depth + 1),
        };
        self.entries.push(entry.clone());
        self.entries.sort_by_key(|e| e.bounds.left);
        self.index = Self::build_index(&self.entries);

        Ok((entry, shifted))
    }

    /// Move `id` (with its subtree) to `position` relative to `target_id`
    ///
    /// Returns an empty change list if the page is already there.
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if either id is not in this scope
    /// - `InvalidMove` for a move relative to itself or into its own subtree
    /// - `MoveConflict` for a sibling position next to the root
    pub fn move_to(
        &mut self,
        id: &str,
        target_id: &str,
        position: MovePosition,
    ) -> Result<Vec<BoundsChange>, PageTreeError> {
        let node = self.require(id)?;
        let target = self.require(target_id)?;

        if node.id == target.id {
            return Err(PageTreeError::invalid_move(format!(
                "page {} cannot be moved relative to itself",
                id
            )));
        }
        if node.bounds.contains_or_equals(&target.bounds) {
            return Err(PageTreeError::invalid_move(format!(
                "page {} cannot be moved into its own subtree (target {})",
                id, target_id
            )));
        }
        if !position.makes_child() && target.parent_id.is_none() {
            return Err(PageTreeError::move_conflict(format!(
                "placing page {} beside root {} would create a second root in scope {}",
                id, target_id, self.scope
            )));
        }

        let n = node.bounds;
        let t = target.bounds;

        let mut bound1 = match position {
            MovePosition::Left => t.left,
            MovePosition::Right => t.right + 1,
            MovePosition::FirstChild => t.left + 1,
            MovePosition::LastChild => t.right,
        };
        if bound1 > n.right {
            bound1 -= 1;
        }
        if bound1 == n.left || bound1 == n.right {
            tracing::debug!(page_id = %id, target_id = %target_id, ?position, "Move is a no-op");
            return Ok(Vec::new());
        }
        let bound2 = if bound1 > n.right { n.right + 1 } else { n.left - 1 };

        let mut edges = [n.left, n.right, bound1, bound2];
        edges.sort_unstable();
        let [a, b, c, d] = edges;

        let (new_parent, new_depth) = if position.makes_child() {
            (Some(target.id.clone()), t.depth + 1)
        } else {
            (target.parent_id.clone(), t.depth)
        };
        let depth_delta = new_depth - n.depth;

        tracing::debug!(
            page_id = %id,
            target_id = %target_id,
            ?position,
            a, b, c, d,
            depth_delta,
            "Computed nested-set move"
        );

        let shift = move |v: i64| {
            if (a..=b).contains(&v) {
                v + d - b
            } else if (c..=d).contains(&v) {
                v + a - c
            } else {
                v
            }
        };

        Ok(self.rewrite(|e| {
            let in_subtree = n.contains_or_equals(&e.bounds);
            let depth = if in_subtree {
                e.bounds.depth + depth_delta
            } else {
                e.bounds.depth
            };
            let parent_id = if e.id == node.id {
                new_parent.clone()
            } else {
                e.parent_id.clone()
            };
            (
                parent_id,
                Bounds::new(shift(e.bounds.left), shift(e.bounds.right), depth),
            )
        }))
    }

    /// Remove `id` and all of its descendants, closing the gap they leave
    pub fn remove_subtree(&mut self, id: &str) -> Result<Removal, PageTreeError> {
        let node = self.require(id)?;
        let n = node.bounds;
        let width = n.width();

        let removed: Vec<String> = self
            .entries
            .iter()
            .filter(|e| n.contains_or_equals(&e.bounds))
            .map(|e| e.id.clone())
            .collect();
        self.entries.retain(|e| !n.contains_or_equals(&e.bounds));

        let shifted = self.rewrite(|e| {
            let left = if e.bounds.left > n.right { e.bounds.left - width } else { e.bounds.left };
            let right = if e.bounds.right > n.right { e.bounds.right - width } else { e.bounds.right };
            (e.parent_id.clone(), Bounds::new(left, right, e.bounds.depth))
        });

        Ok(Removal { removed, shifted })
    }

    /// Check every nested-set invariant of the scope
    ///
    /// - at most one root, placed first, at depth 0
    /// - bounds are exactly `1..=2n`, each used once, with `left < right`
    /// - every non-root entry lies strictly inside its parent's interval,
    ///   one level deeper, and its `parent_id` names the enclosing entry
    ///
    /// # Errors
    ///
    /// `InvalidMove` describing the first violation found.
    pub fn verify(&self) -> Result<(), PageTreeError> {
        let corrupt = |msg: String| {
            Err(PageTreeError::invalid_move(format!(
                "corrupt nested set in scope {}: {}",
                self.scope, msg
            )))
        };

        let n = self.entries.len() as i64;
        let mut seen = vec![false; (2 * n) as usize];
        for e in &self.entries {
            if e.bounds.left >= e.bounds.right {
                return corrupt(format!("page {} has left >= right", e.id));
            }
            for v in [e.bounds.left, e.bounds.right] {
                if v < 1 || v > 2 * n {
                    return corrupt(format!("page {} has bound {} outside 1..={}", e.id, v, 2 * n));
                }
                let slot = &mut seen[(v - 1) as usize];
                if *slot {
                    return corrupt(format!("bound {} is used twice", v));
                }
                *slot = true;
            }
        }

        let mut stack: Vec<&TreeEntry> = Vec::new();
        for (i, e) in self.entries.iter().enumerate() {
            while stack.last().is_some_and(|top| top.bounds.right < e.bounds.left) {
                stack.pop();
            }

            match stack.last() {
                None => {
                    if i != 0 {
                        return corrupt(format!("page {} is a second root", e.id));
                    }
                    if e.parent_id.is_some() {
                        return corrupt(format!("top page {} has a parent", e.id));
                    }
                    if e.bounds.depth != 0 {
                        return corrupt(format!("root {} has depth {}", e.id, e.bounds.depth));
                    }
                }
                Some(parent) => {
                    if e.parent_id.as_deref() != Some(parent.id.as_str()) {
                        return corrupt(format!(
                            "page {} lies inside {} but names parent {:?}",
                            e.id, parent.id, e.parent_id
                        ));
                    }
                    if e.bounds.right >= parent.bounds.right {
                        return corrupt(format!("page {} overlaps its parent {}", e.id, parent.id));
                    }
                    if e.bounds.depth != parent.bounds.depth + 1 {
                        return corrupt(format!(
                            "page {} has depth {} under parent depth {}",
                            e.id, e.bounds.depth, parent.bounds.depth
                        ));
                    }
                }
            }
            stack.push(e);
        }

        Ok(())
    }
}
