//! Page Data Structures
//!
//! A page is one node of a nested-set tree. Its position is fully described by
//! its [`Bounds`]; `parent_id` is kept alongside for cheap sibling queries.
//!
//! # Examples
//!
//! ```rust
//! use pagetree_core::models::{Bounds, Scope, TreeNode};
//! # use pagetree_core::models::Page;
//! # use chrono::Utc;
//! # fn page(id: &str, parent: Option<&str>, l: i64, r: i64, d: i64) -> Page {
//! #     Page {
//! #         id: id.to_string(),
//! #         parent_id: parent.map(str::to_string),
//! #         left: l, right: r, depth: d,
//! #         scope: Scope::unscoped(),
//! #         created_at: Utc::now(), modified_at: Utc::now(),
//! #     }
//! # }
//! let first = page("a", Some("root"), 2, 3, 1);
//! let second = page("b", Some("root"), 4, 5, 1);
//!
//! assert!(first.is_exactly_above(&second));
//! assert!(second.is_exactly_below(&first));
//! assert!(first.is_sibling_of(&second));
//! ```

use super::Slug;
use crate::services::error::PageTreeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Nested-set interval of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i64,
    pub right: i64,
    pub depth: i64,
}

impl Bounds {
    pub fn new(left: i64, right: i64, depth: i64) -> Self {
        Self { left, right, depth }
    }

    /// Number of bound slots the subtree occupies (`2 * subtree size`)
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// True if `other` lies strictly inside this interval
    pub fn contains(&self, other: &Bounds) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// True if `other` is this interval or lies inside it
    pub fn contains_or_equals(&self, other: &Bounds) -> bool {
        self.left <= other.left && other.right <= self.right
    }
}

/// Values of the configured scope columns for one tree
///
/// Each distinct scope is an independent tree with its own root. A column
/// missing from the map is the same as a column set to NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(BTreeMap<String, Option<String>>);

impl Scope {
    /// The scope of an unscoped configuration (or the all-NULL scope)
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Set a scope column to a value
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), Some(value.into()));
        self
    }

    /// Set a scope column to NULL explicitly
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.0.insert(column.into(), None);
        self
    }

    /// Value of a scope column, if set
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Option::is_none)
    }

    /// Column values in the order of `columns`, with absent columns as NULL
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the scope names a column that is not
    /// configured.
    pub fn values_for(&self, columns: &[String]) -> Result<Vec<Option<String>>, PageTreeError> {
        if let Some(unknown) = self.0.keys().find(|k| !columns.contains(k)) {
            return Err(PageTreeError::configuration(format!(
                "Scope column '{}' is not configured",
                unknown
            )));
        }

        Ok(columns
            .iter()
            .map(|c| self.0.get(c).cloned().flatten())
            .collect())
    }

    /// Canonical form: every configured column present, nothing else
    ///
    /// Two scopes select the same tree exactly when their normalized forms are
    /// equal.
    pub fn normalized(&self, columns: &[String]) -> Result<Self, PageTreeError> {
        let values = self.values_for(columns)?;
        Ok(Self::from_columns(columns, values))
    }

    /// Build a scope from column names and row values
    pub fn from_columns(columns: &[String], values: Vec<Option<String>>) -> Self {
        Self(columns.iter().cloned().zip(values).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.0.iter()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{unscoped}");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.as_deref().unwrap_or("NULL")))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Structural capability of a nested-set node
///
/// Everything that can report its id, parent, bounds and scope gets the
/// position predicates for free.
pub trait TreeNode {
    fn id(&self) -> &str;

    fn parent_id(&self) -> Option<&str>;

    fn bounds(&self) -> Bounds;

    fn scope(&self) -> &Scope;

    fn is_root(&self) -> bool {
        self.parent_id().is_none()
    }

    fn is_leaf(&self) -> bool {
        let b = self.bounds();
        b.right - b.left == 1
    }

    /// `self` ends right where `other` begins
    fn is_exactly_above<T: TreeNode + ?Sized>(&self, other: &T) -> bool {
        self.bounds().right == other.bounds().left - 1
    }

    /// `self` begins right where `other` ends
    fn is_exactly_below<T: TreeNode + ?Sized>(&self, other: &T) -> bool {
        self.bounds().left == other.bounds().right + 1
    }

    fn is_sibling_of<T: TreeNode + ?Sized>(&self, other: &T) -> bool {
        self.bounds().depth == other.bounds().depth && self.parent_id() == other.parent_id()
    }

    fn is_ancestor_of<T: TreeNode + ?Sized>(&self, other: &T) -> bool {
        self.scope() == other.scope() && self.bounds().contains(&other.bounds())
    }

    fn is_descendant_of<T: TreeNode + ?Sized>(&self, other: &T) -> bool {
        other.is_ancestor_of(self)
    }
}

/// One page of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Parent page (None means this page is the root of its scope)
    pub parent_id: Option<String>,

    /// Nested-set left bound
    pub left: i64,

    /// Nested-set right bound
    pub right: i64,

    /// Distance from the root (root = 0)
    pub depth: i64,

    /// Tree partition this page belongs to
    pub scope: Scope,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl TreeNode for Page {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(self.left, self.right, self.depth)
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// A page with its slugs and nested children
///
/// Produced by `PageTreeService::get_tree`; children are in `left` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTree {
    pub page: Page,
    pub slugs: Vec<Slug>,
    pub children: Vec<PageTree>,
}

impl PageTree {
    /// Slug of this page in a language
    pub fn slug(&self, lang_code: &str) -> Option<&Slug> {
        self.slugs.iter().find(|s| s.lang_code == lang_code)
    }

    /// Number of pages in this tree, including the top page
    pub fn page_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            count += 1;
            stack.extend(tree.children.iter());
        }
        count
    }

    /// Find a page anywhere in the tree
    pub fn find(&self, id: &str) -> Option<&PageTree> {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            if tree.page.id == id {
                return Some(tree);
            }
            stack.extend(tree.children.iter());
        }
        None
    }
}
