//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and connection management
//! - Write transactions (`BEGIN IMMEDIATE` / `COMMIT` / `ROLLBACK`)
//! - SQL for the configured pages and slugs tables
//!
//! # Architecture
//!
//! Pages are stored with nested-set bounds (`lft`, `rgt`, `depth`) plus an
//! adjacency `parent_id`. Slugs reference their page with `ON DELETE CASCADE`.
//! Tree arithmetic never happens in SQL: services compute new bounds with
//! [`crate::tree::NestedSet`] and write the changed rows back here.

mod database;
mod error;
mod page_store;

pub use database::{DatabaseService, BUSY_TIMEOUT_MS};
pub use error::DatabaseError;
pub use page_store::PageStore;
