//! Business Services
//!
//! This module contains the page tree services:
//!
//! - `PageTreeService` - create, move and delete pages; structural queries
//! - `LookupService` - URL resolution and URL building
//! - `SlugService` - slug creation and updates with sibling uniqueness
//!
//! Services share one `Arc<PageStore>` and run each mutation in its own write
//! transaction.

pub mod error;
pub mod lookup_service;
pub mod page_tree_service;
pub mod slug_service;

pub use error::PageTreeError;
pub use lookup_service::LookupService;
pub use page_tree_service::PageTreeService;
pub use slug_service::SlugService;
