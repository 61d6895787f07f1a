//! Page Tree Core
//!
//! A hierarchy of pages stored as a nested set, with per-language slugs used
//! to resolve and build hierarchical URLs.
//!
//! # Architecture
//!
//! - **Nested set**: every page carries `lft`/`rgt`/`depth` bounds; subtree and
//!   ancestor queries are single range scans
//! - **Scopes**: optional scope columns split the pages into independent
//!   trees, each with exactly one root
//! - **Slugs**: one per page and language, unique among sibling pages
//! - **libsql**: embedded SQLite-compatible storage, WAL mode
//!
//! # Modules
//!
//! - [`config`] - table names, scope columns, slug separator and suffix policy
//! - [`models`] - Page, Slug, Scope, PageTree
//! - [`tree`] - pure nested-set arithmetic and hierarchy walks
//! - [`slug`] - slugification and sibling-unique suffixing
//! - [`db`] - connection management and SQL
//! - [`services`] - PageTreeService, LookupService, SlugService

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod slug;
pub mod tree;

// Re-export commonly used types
pub use config::{PageTreeConfig, SuffixPolicy};
pub use models::*;
pub use services::*;
