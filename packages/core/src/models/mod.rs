//! Data Models
//!
//! - `Page` - one node of a nested-set tree, with its `Bounds` and `Scope`
//! - `Slug` - localized name and URL segment of a page
//! - `PageTree` - nested view of a subtree with slugs
//! - `TreeNode` - structural capability shared by anything with bounds

mod page;
mod slug;

pub use page::{Bounds, Page, PageTree, Scope, TreeNode};
pub use slug::{NewSlug, Slug, SlugChanges};
