//! Pure tree algebra
//!
//! - `NestedSet` - bounds arithmetic for insert, move and remove, plus `verify`
//! - `Hierarchy` - adjacency of a materialized subtree for level-by-level walks
//!
//! Nothing here touches the database; the services load rows, run these
//! computations and persist the result.

mod hierarchy;
mod nested_set;

pub use hierarchy::Hierarchy;
pub use nested_set::{BoundsChange, MovePosition, NestedSet, Removal, TreeEntry};
