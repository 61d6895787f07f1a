//! Page Tree Service - Structural Operations
//!
//! Creates, moves and deletes pages and answers the structural queries
//! (ancestors, descendants, children, siblings, nested tree).
//!
//! # Mutations
//!
//! Every mutation runs on its own connection inside `BEGIN IMMEDIATE`:
//!
//! 1. read the pages involved and every entry of their scope
//! 2. compute the new bounds with [`NestedSet`]
//! 3. `verify()` the computed tree
//! 4. write back only the rows that changed
//!
//! Any error rolls the transaction back, so a rejected mutation never leaves
//! a partial renumbering behind. Queries that take more than one statement
//! run inside a read transaction and see a single snapshot.
//!
//! # Single Root
//!
//! Each scope holds exactly one tree. `create_root` refuses a second root and
//! sibling moves next to the root are refused with `MoveConflict`.

use crate::db::{DatabaseService, PageStore};
use crate::models::{Page, PageTree, Scope, Slug};
use crate::services::error::PageTreeError;
use crate::tree::{BoundsChange, Hierarchy, MovePosition, NestedSet, TreeEntry};
use chrono::Utc;
use libsql::Connection;
use std::sync::Arc;

/// Structural operations on the page tree
///
/// # Examples
///
/// ```no_run
/// # use pagetree_core::config::PageTreeConfig;
/// # use pagetree_core::db::{DatabaseService, PageStore};
/// # use pagetree_core::models::Scope;
/// # use pagetree_core::services::PageTreeService;
/// # use std::path::PathBuf;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Arc::new(DatabaseService::new(PathBuf::from("./data/pages.db")).await?);
/// let store = Arc::new(PageStore::new(db, PageTreeConfig::default()).await?);
/// let tree = PageTreeService::new(store);
///
/// let root = tree.create_root(&Scope::unscoped()).await?;
/// let about = tree.create_child(&root.id, &Scope::unscoped()).await?;
/// let blog = tree.create_child(&root.id, &Scope::unscoped()).await?;
/// tree.move_above(&blog.id, &about.id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PageTreeService {
    store: Arc<PageStore>,
}

impl PageTreeService {
    pub fn new(store: Arc<PageStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PageStore> {
        &self.store
    }

    fn db(&self) -> &DatabaseService {
        self.store.db()
    }

    fn normalize(&self, scope: &Scope) -> Result<Scope, PageTreeError> {
        scope.normalized(&self.store.config().scope_columns)
    }

    async fn load_set(&self, conn: &Connection, scope: &Scope) -> Result<NestedSet, PageTreeError> {
        let pages = self.store.scope_pages(conn, scope).await?;
        Ok(NestedSet::new(
            scope.clone(),
            pages.iter().map(TreeEntry::from).collect(),
        ))
    }

    /// Verify the computed tree, then persist the changed rows
    async fn write_changes(
        &self,
        conn: &Connection,
        set: &NestedSet,
        changes: &[BoundsChange],
    ) -> Result<(), PageTreeError> {
        set.verify()?;
        self.store.apply_bounds_changes(conn, changes).await
    }

    //
    // CREATE
    //

    /// Create the root page of a scope at `(1, 2, 0)`
    ///
    /// # Errors
    ///
    /// - `RootConflict` if the scope already has a root
    /// - `ConfigurationError` if the scope names an unknown column
    pub async fn create_root(&self, scope: &Scope) -> Result<Page, PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.create_root_in(&conn, scope).await;
        self.db().finish(&conn, result).await
    }

    async fn create_root_in(&self, conn: &Connection, scope: Scope) -> Result<Page, PageTreeError> {
        let mut set = self.load_set(conn, &scope).await?;
        let entry = set.insert_root(uuid::Uuid::new_v4().to_string())?;

        let now = Utc::now();
        let page = Page {
            id: entry.id,
            parent_id: None,
            left: entry.bounds.left,
            right: entry.bounds.right,
            depth: entry.bounds.depth,
            scope,
            created_at: now,
            modified_at: now,
        };
        self.store.insert_page(conn, &page).await?;

        tracing::info!("Created root page {} for scope {}", page.id, page.scope);
        Ok(page)
    }

    /// Append a new page as the last child of `parent_id`
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if the parent does not exist
    /// - `ScopeMismatch` if `scope` differs from the parent's scope
    pub async fn create_child(&self, parent_id: &str, scope: &Scope) -> Result<Page, PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.create_child_in(&conn, parent_id, scope).await;
        self.db().finish(&conn, result).await
    }

    async fn create_child_in(
        &self,
        conn: &Connection,
        parent_id: &str,
        scope: Scope,
    ) -> Result<Page, PageTreeError> {
        let parent = self.store.require_page(conn, parent_id).await?;
        if parent.scope != scope {
            return Err(PageTreeError::scope_mismatch(
                parent_id,
                parent.scope.clone(),
                scope,
            ));
        }

        let mut set = self.load_set(conn, &parent.scope).await?;
        let (entry, shifted) = set.insert_last_child(&parent.id, uuid::Uuid::new_v4().to_string())?;
        self.write_changes(conn, &set, &shifted).await?;

        let now = Utc::now();
        let page = Page {
            id: entry.id,
            parent_id: entry.parent_id,
            left: entry.bounds.left,
            right: entry.bounds.right,
            depth: entry.bounds.depth,
            scope,
            created_at: now,
            modified_at: now,
        };
        self.store.insert_page(conn, &page).await?;

        tracing::debug!(
            "Inserted page {} under {} at ({}, {}), shifted {} rows",
            page.id,
            parent.id,
            page.left,
            page.right,
            shifted.len()
        );
        tracing::info!("Created page {} under {}", page.id, parent.id);
        Ok(page)
    }

    //
    // MOVE
    //

    /// Place `id` (with its subtree) immediately before `target_id`
    pub async fn move_above(&self, id: &str, target_id: &str) -> Result<Page, PageTreeError> {
        self.move_page(id, target_id, MovePosition::Left).await
    }

    /// Place `id` (with its subtree) immediately after `target_id`
    pub async fn move_below(&self, id: &str, target_id: &str) -> Result<Page, PageTreeError> {
        self.move_page(id, target_id, MovePosition::Right).await
    }

    pub async fn make_first_child_of(&self, id: &str, parent_id: &str) -> Result<Page, PageTreeError> {
        self.move_page(id, parent_id, MovePosition::FirstChild).await
    }

    pub async fn make_last_child_of(&self, id: &str, parent_id: &str) -> Result<Page, PageTreeError> {
        self.move_page(id, parent_id, MovePosition::LastChild).await
    }

    /// Alias of [`PageTreeService::make_last_child_of`]
    pub async fn make_child_of(&self, id: &str, parent_id: &str) -> Result<Page, PageTreeError> {
        self.make_last_child_of(id, parent_id).await
    }

    /// Move a page with its subtree relative to a target
    ///
    /// Returns the moved page as stored after the move.
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if either page does not exist
    /// - `InvalidMove` for a target that is the page itself, inside its
    ///   subtree, or in another scope
    /// - `MoveConflict` for a sibling position next to the root
    pub async fn move_page(
        &self,
        id: &str,
        target_id: &str,
        position: MovePosition,
    ) -> Result<Page, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.move_page_in(&conn, id, target_id, position).await;
        self.db().finish(&conn, result).await
    }

    async fn move_page_in(
        &self,
        conn: &Connection,
        id: &str,
        target_id: &str,
        position: MovePosition,
    ) -> Result<Page, PageTreeError> {
        let node = self.store.require_page(conn, id).await?;
        let target = self.store.require_page(conn, target_id).await?;
        if node.scope != target.scope {
            return Err(PageTreeError::invalid_move(format!(
                "page {} in {} cannot be moved relative to page {} in {}",
                id, node.scope, target_id, target.scope
            )));
        }

        let mut set = self.load_set(conn, &node.scope).await?;
        let changes = set.move_to(id, target_id, position)?;
        if changes.is_empty() {
            return Ok(node);
        }

        self.write_changes(conn, &set, &changes).await?;
        self.store.touch_page(conn, id, Utc::now()).await?;

        tracing::info!(
            "Moved page {} {:?} of {} ({} rows renumbered)",
            id,
            position,
            target_id,
            changes.len()
        );
        self.store.require_page(conn, id).await
    }

    /// Make a page the root of its scope
    ///
    /// A scope holds a single tree, so this only succeeds for the page that
    /// already is the root (as a no-op).
    ///
    /// # Errors
    ///
    /// `MoveConflict` for any non-root page.
    pub async fn make_root(&self, id: &str) -> Result<Page, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        let page = self.store.require_page(&conn, id).await?;
        if page.parent_id.is_none() {
            return Ok(page);
        }

        let root = self.store.root_of_scope(&conn, &page.scope).await?;
        Err(PageTreeError::move_conflict(format!(
            "scope {} already has root {}; page {} cannot become a second root",
            page.scope,
            root.map(|r| r.id).unwrap_or_default(),
            id
        )))
    }

    //
    // DELETE
    //

    /// Delete a page, its subtree and all their slugs
    ///
    /// Returns the ids of the deleted pages in `left` order.
    pub async fn delete_page(&self, id: &str) -> Result<Vec<String>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.delete_page_in(&conn, id).await;
        self.db().finish(&conn, result).await
    }

    async fn delete_page_in(&self, conn: &Connection, id: &str) -> Result<Vec<String>, PageTreeError> {
        let page = self.store.require_page(conn, id).await?;
        let mut set = self.load_set(conn, &page.scope).await?;
        let removal = set.remove_subtree(id)?;

        let deleted = self.store.delete_subtree(conn, &page).await?;
        if deleted != removal.removed.len() as u64 {
            return Err(PageTreeError::invalid_move(format!(
                "deleting subtree of {} removed {} rows, expected {}",
                id,
                deleted,
                removal.removed.len()
            )));
        }
        self.write_changes(conn, &set, &removal.shifted).await?;

        tracing::info!("Deleted page {} with {} descendants", id, removal.removed.len() - 1);
        Ok(removal.removed)
    }

    //
    // QUERIES
    //

    pub async fn get_page(&self, id: &str) -> Result<Page, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.store.require_page(&conn, id).await
    }

    /// Root of a scope, if the scope has a tree
    pub async fn root(&self, scope: &Scope) -> Result<Option<Page>, PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.store.root_of_scope(&conn, &scope).await
    }

    pub async fn ancestors_and_self(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            self.store.ancestors(&conn, &page, true).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    pub async fn ancestors(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            self.store.ancestors(&conn, &page, false).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    pub async fn descendants_and_self(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            self.store.descendants(&conn, &page, true, None).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    pub async fn descendants(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            self.store.descendants(&conn, &page, false, None).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    pub async fn children(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            self.store.require_page(&conn, id).await?;
            self.store.children(&conn, id).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    pub async fn siblings(&self, id: &str) -> Result<Vec<Page>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Page>, PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            self.store.siblings(&conn, &page).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    /// Nested view of the subtree rooted at `id`, with every page's slugs
    pub async fn get_tree(&self, id: &str) -> Result<PageTree, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<(Vec<Page>, Vec<Slug>), PageTreeError> = async {
            let page = self.store.require_page(&conn, id).await?;
            let pages = self.store.descendants(&conn, &page, true, None).await?;
            let slugs = self.store.subtree_slugs(&conn, &page, None).await?;
            Ok((pages, slugs))
        }
        .await;
        let (pages, slugs) = self.db().finish_read(&conn, result).await?;

        Hierarchy::new(pages, slugs)
            .into_page_tree()
            .ok_or_else(|| PageTreeError::page_not_found(id))
    }

    /// Check the stored bounds of a scope against every nested-set invariant
    pub async fn verify_scope(&self, scope: &Scope) -> Result<(), PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.load_set(&conn, &scope).await?.verify()
    }
}
