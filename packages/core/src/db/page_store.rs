//! Page and Slug Persistence
//!
//! All SQL for the configured pages and slugs tables. Methods take the
//! connection to run on, so a service can issue several of them inside one
//! transaction.
//!
//! Table and column names come from a validated [`PageTreeConfig`]; every
//! value goes through a positional parameter.
//!
//! # Row Format
//!
//! Page queries select, in order:
//! `id, parent_id, lft, rgt, depth, created_at, modified_at, <scope columns...>`
//!
//! Slug queries select, in order:
//! `id, <page fk>, lang_code, name, slug, created_at, modified_at`

use crate::config::PageTreeConfig;
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{Page, Scope, Slug};
use crate::services::error::PageTreeError;
use crate::tree::BoundsChange;
use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::params::Params;
use libsql::{Connection, Row, Value};
use std::sync::Arc;

/// Number of fixed page columns before the scope columns
const PAGE_FIXED_COLUMNS: i32 = 7;

fn text(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

fn opt_text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}

fn positional(values: Vec<Value>) -> Params {
    if values.is_empty() {
        Params::None
    } else {
        Params::Positional(values)
    }
}

/// SQL access to pages and slugs for one configuration
#[derive(Debug, Clone)]
pub struct PageStore {
    db: Arc<DatabaseService>,
    config: Arc<PageTreeConfig>,
    page_select: String,
    slug_select: String,
}

impl PageStore {
    /// Validate the configuration and create the tables if needed
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` if the configuration is invalid
    /// - `Database` if the schema cannot be created
    pub async fn new(db: Arc<DatabaseService>, config: PageTreeConfig) -> Result<Self, PageTreeError> {
        config.validate()?;

        let mut page_columns: Vec<String> = [
            "id",
            "parent_id",
            "lft",
            "rgt",
            "depth",
            "created_at",
            "modified_at",
        ]
        .iter()
        .map(|c| format!("p.{}", c))
        .collect();
        page_columns.extend(config.scope_columns.iter().map(|c| format!("p.{}", c)));

        let slug_select = format!(
            "s.id, s.{}, s.lang_code, s.name, s.slug, s.created_at, s.modified_at",
            config.page_foreign_key
        );

        let store = Self {
            db,
            config: Arc::new(config),
            page_select: page_columns.join(", "),
            slug_select,
        };
        store.initialize_schema().await?;
        Ok(store)
    }

    pub fn db(&self) -> &Arc<DatabaseService> {
        &self.db
    }

    pub fn config(&self) -> &PageTreeConfig {
        &self.config
    }

    fn pages(&self) -> &str {
        &self.config.pages_table
    }

    fn slugs(&self) -> &str {
        &self.config.slugs_table
    }

    fn fk(&self) -> &str {
        &self.config.page_foreign_key
    }

    /// Create the pages and slugs tables and their indexes
    ///
    /// Idempotent (`IF NOT EXISTS` everywhere). Scope columns are plain
    /// nullable TEXT columns on the pages table.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let scope_columns: String = self
            .config
            .scope_columns
            .iter()
            .map(|c| format!("\n                {} TEXT,", c))
            .collect();

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {pages} (
                    id TEXT PRIMARY KEY,
                    parent_id TEXT,
                    lft INTEGER NOT NULL,
                    rgt INTEGER NOT NULL,
                    depth INTEGER NOT NULL DEFAULT 0,{scope_columns}
                    created_at TEXT NOT NULL,
                    modified_at TEXT NOT NULL
                )",
                pages = self.pages(),
                scope_columns = scope_columns,
            ),
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create {} table: {}", self.pages(), e))
        })?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {slugs} (
                    id TEXT PRIMARY KEY,
                    {fk} TEXT NOT NULL,
                    lang_code TEXT NOT NULL,
                    name TEXT NOT NULL,
                    slug TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    modified_at TEXT NOT NULL,
                    UNIQUE ({fk}, lang_code),
                    FOREIGN KEY ({fk}) REFERENCES {pages}(id) ON DELETE CASCADE
                )",
                slugs = self.slugs(),
                fk = self.fk(),
                pages = self.pages(),
            ),
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create {} table: {}", self.slugs(), e))
        })?;

        let indexes = [
            (format!("idx_{}_parent", self.pages()), format!("{}(parent_id)", self.pages())),
            (format!("idx_{}_lft", self.pages()), format!("{}(lft)", self.pages())),
            (format!("idx_{}_rgt", self.pages()), format!("{}(rgt)", self.pages())),
            (
                format!("idx_{}_lang_slug", self.slugs()),
                format!("{}(lang_code, slug)", self.slugs()),
            ),
        ];
        for (name, target) in indexes {
            conn.execute(&format!("CREATE INDEX IF NOT EXISTS {} ON {}", name, target), ())
                .await
                .map_err(|e| {
                    DatabaseError::initialization_failed(format!("Failed to create index '{}': {}", name, e))
                })?;
        }

        if self.db.is_new_database() {
            self.db
                .execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    fn parse_timestamp(s: &str) -> AnyResult<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        Err(anyhow::anyhow!(
            "Unable to parse timestamp '{}' as SQLite or RFC3339 format",
            s
        ))
    }

    fn row_to_page(&self, row: &Row) -> AnyResult<Page> {
        let id: String = row.get(0).context("Failed to get id")?;
        let parent_id: Option<String> = row.get(1).context("Failed to get parent_id")?;
        let left: i64 = row.get(2).context("Failed to get lft")?;
        let right: i64 = row.get(3).context("Failed to get rgt")?;
        let depth: i64 = row.get(4).context("Failed to get depth")?;
        let created_at_str: String = row.get(5).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(6).context("Failed to get modified_at")?;

        let mut scope_values = Vec::with_capacity(self.config.scope_columns.len());
        for (i, column) in self.config.scope_columns.iter().enumerate() {
            let value: Option<String> = row
                .get(PAGE_FIXED_COLUMNS + i as i32)
                .with_context(|| format!("Failed to get scope column {}", column))?;
            scope_values.push(value);
        }

        Ok(Page {
            id,
            parent_id,
            left,
            right,
            depth,
            scope: Scope::from_columns(&self.config.scope_columns, scope_values),
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
            modified_at: Self::parse_timestamp(&modified_at_str)
                .context("Failed to parse modified_at")?,
        })
    }

    fn row_to_slug(row: &Row) -> AnyResult<Slug> {
        let created_at_str: String = row.get(5).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(6).context("Failed to get modified_at")?;

        Ok(Slug {
            id: row.get(0).context("Failed to get id")?,
            page_id: row.get(1).context("Failed to get page id")?,
            lang_code: row.get(2).context("Failed to get lang_code")?,
            name: row.get(3).context("Failed to get name")?,
            slug: row.get(4).context("Failed to get slug")?,
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
            modified_at: Self::parse_timestamp(&modified_at_str)
                .context("Failed to parse modified_at")?,
        })
    }

    /// ` AND p.col IS ?` for every scope column, plus the values
    fn scope_filter(&self, scope: &Scope) -> Result<(String, Vec<Value>), PageTreeError> {
        let values = scope.values_for(&self.config.scope_columns)?;
        let clause: String = self
            .config
            .scope_columns
            .iter()
            .map(|c| format!(" AND p.{} IS ?", c))
            .collect();
        Ok((clause, values.into_iter().map(opt_text).collect()))
    }

    async fn query_pages(
        &self,
        conn: &Connection,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Page>, PageTreeError> {
        let mut rows = conn
            .query(sql, positional(params))
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to query pages: {}", e)))?;

        let mut pages = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::LibsqlError)? {
            pages.push(self.row_to_page(&row).map_err(DatabaseError::from)?);
        }
        Ok(pages)
    }

    async fn query_slugs(
        &self,
        conn: &Connection,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Slug>, PageTreeError> {
        let mut rows = conn
            .query(sql, positional(params))
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to query slugs: {}", e)))?;

        let mut slugs = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::LibsqlError)? {
            slugs.push(Self::row_to_slug(&row).map_err(DatabaseError::from)?);
        }
        Ok(slugs)
    }

    async fn execute(
        &self,
        conn: &Connection,
        sql: &str,
        params: Vec<Value>,
        context: &str,
    ) -> Result<u64, PageTreeError> {
        conn.execute(sql, positional(params))
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("{}: {}", context, e)).into())
    }

    //
    // PAGES
    //

    pub async fn get_page(&self, conn: &Connection, id: &str) -> Result<Option<Page>, PageTreeError> {
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.id = ?",
            self.page_select,
            self.pages()
        );
        Ok(self.query_pages(conn, &sql, vec![text(id)]).await?.into_iter().next())
    }

    /// Like `get_page`, but a missing page is `PageNotFound`
    pub async fn require_page(&self, conn: &Connection, id: &str) -> Result<Page, PageTreeError> {
        self.get_page(conn, id)
            .await?
            .ok_or_else(|| PageTreeError::page_not_found(id))
    }

    pub async fn root_of_scope(
        &self,
        conn: &Connection,
        scope: &Scope,
    ) -> Result<Option<Page>, PageTreeError> {
        let (clause, params) = self.scope_filter(scope)?;
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.parent_id IS NULL{} ORDER BY p.lft LIMIT 1",
            self.page_select,
            self.pages(),
            clause
        );
        Ok(self.query_pages(conn, &sql, params).await?.into_iter().next())
    }

    /// Every page of a scope, in `left` order
    pub async fn scope_pages(&self, conn: &Connection, scope: &Scope) -> Result<Vec<Page>, PageTreeError> {
        let (clause, params) = self.scope_filter(scope)?;
        let sql = format!(
            "SELECT {} FROM {} p WHERE 1 = 1{} ORDER BY p.lft",
            self.page_select,
            self.pages(),
            clause
        );
        self.query_pages(conn, &sql, params).await
    }

    pub async fn insert_page(&self, conn: &Connection, page: &Page) -> Result<(), PageTreeError> {
        let scope_values = page.scope.values_for(&self.config.scope_columns)?;

        let mut columns = vec![
            "id", "parent_id", "lft", "rgt", "depth", "created_at", "modified_at",
        ]
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
        columns.extend(self.config.scope_columns.iter().cloned());
        let placeholders = vec!["?"; columns.len()].join(", ");

        let mut params = vec![
            text(&page.id),
            opt_text(page.parent_id.clone()),
            Value::Integer(page.left),
            Value::Integer(page.right),
            Value::Integer(page.depth),
            text(page.created_at.to_rfc3339()),
            text(page.modified_at.to_rfc3339()),
        ];
        params.extend(scope_values.into_iter().map(opt_text));

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.pages(),
            columns.join(", "),
            placeholders
        );
        self.execute(conn, &sql, params, &format!("Failed to insert page {}", page.id))
            .await?;
        Ok(())
    }

    /// Write the new parent and bounds of every changed row
    pub async fn apply_bounds_changes(
        &self,
        conn: &Connection,
        changes: &[BoundsChange],
    ) -> Result<(), PageTreeError> {
        let sql = format!(
            "UPDATE {} SET parent_id = ?, lft = ?, rgt = ?, depth = ? WHERE id = ?",
            self.pages()
        );
        for change in changes {
            self.execute(
                conn,
                &sql,
                vec![
                    opt_text(change.parent_id.clone()),
                    Value::Integer(change.bounds.left),
                    Value::Integer(change.bounds.right),
                    Value::Integer(change.bounds.depth),
                    text(&change.id),
                ],
                &format!("Failed to update bounds of page {}", change.id),
            )
            .await?;
        }
        Ok(())
    }

    pub async fn touch_page(
        &self,
        conn: &Connection,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PageTreeError> {
        let sql = format!("UPDATE {} SET modified_at = ? WHERE id = ?", self.pages());
        self.execute(conn, &sql, vec![text(at.to_rfc3339()), text(id)], "Failed to touch page")
            .await?;
        Ok(())
    }

    /// Delete a page and its whole subtree; slugs follow by cascade
    pub async fn delete_subtree(&self, conn: &Connection, page: &Page) -> Result<u64, PageTreeError> {
        let (clause, mut params) = self.scope_filter(&page.scope)?;
        let sql = format!(
            "DELETE FROM {pages} WHERE id IN (SELECT p.id FROM {pages} p WHERE p.lft >= ? AND p.rgt <= ?{clause})",
            pages = self.pages(),
            clause = clause
        );
        params.insert(0, Value::Integer(page.right));
        params.insert(0, Value::Integer(page.left));
        self.execute(conn, &sql, params, &format!("Failed to delete subtree of {}", page.id))
            .await
    }

    /// Ancestors of a page (optionally with the page), root first
    pub async fn ancestors(
        &self,
        conn: &Connection,
        page: &Page,
        include_self: bool,
    ) -> Result<Vec<Page>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&page.scope)?;
        let (lo, hi) = if include_self { ("<=", ">=") } else { ("<", ">") };
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.lft {} ? AND p.rgt {} ?{} ORDER BY p.lft",
            self.page_select,
            self.pages(),
            lo,
            hi,
            clause
        );
        let mut params = vec![Value::Integer(page.left), Value::Integer(page.right)];
        params.extend(scope_params);
        self.query_pages(conn, &sql, params).await
    }

    /// Descendants of a page (optionally with the page) in `left` order
    ///
    /// `max_depth` limits the absolute depth of the returned pages.
    pub async fn descendants(
        &self,
        conn: &Connection,
        page: &Page,
        include_self: bool,
        max_depth: Option<i64>,
    ) -> Result<Vec<Page>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&page.scope)?;
        let (lo, hi) = if include_self { (">=", "<=") } else { (">", "<") };
        let depth_clause = if max_depth.is_some() { " AND p.depth <= ?" } else { "" };
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.lft {} ? AND p.rgt {} ?{}{} ORDER BY p.lft",
            self.page_select,
            self.pages(),
            lo,
            hi,
            clause,
            depth_clause
        );
        let mut params = vec![Value::Integer(page.left), Value::Integer(page.right)];
        params.extend(scope_params);
        if let Some(depth) = max_depth {
            params.push(Value::Integer(depth));
        }
        self.query_pages(conn, &sql, params).await
    }

    pub async fn children(&self, conn: &Connection, page_id: &str) -> Result<Vec<Page>, PageTreeError> {
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.parent_id = ? ORDER BY p.lft",
            self.page_select,
            self.pages()
        );
        self.query_pages(conn, &sql, vec![text(page_id)]).await
    }

    /// Pages sharing the parent and scope of `page`, excluding it
    pub async fn siblings(&self, conn: &Connection, page: &Page) -> Result<Vec<Page>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&page.scope)?;
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.parent_id IS ? AND p.id != ?{} ORDER BY p.lft",
            self.page_select,
            self.pages(),
            clause
        );
        let mut params = vec![opt_text(page.parent_id.clone()), text(&page.id)];
        params.extend(scope_params);
        self.query_pages(conn, &sql, params).await
    }

    /// Pages at `depth` holding `slug` in `lang_code`, deepest first
    pub async fn match_candidates(
        &self,
        conn: &Connection,
        scope: &Scope,
        lang_code: &str,
        slug: &str,
        depth: i64,
    ) -> Result<Vec<Page>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(scope)?;
        let sql = format!(
            "SELECT {select} FROM {pages} p
             JOIN {slugs} s ON s.{fk} = p.id
             WHERE s.lang_code = ? AND s.slug = ? AND p.depth = ?{clause}
             ORDER BY p.depth DESC, p.lft",
            select = self.page_select,
            pages = self.pages(),
            slugs = self.slugs(),
            fk = self.fk(),
            clause = clause
        );
        let mut params = vec![text(lang_code), text(slug), Value::Integer(depth)];
        params.extend(scope_params);
        self.query_pages(conn, &sql, params).await
    }

    /// `(page id, slug in lang_code)` for the ancestors-and-self chain, root first
    pub async fn chain_slugs(
        &self,
        conn: &Connection,
        page: &Page,
        lang_code: &str,
    ) -> Result<Vec<(String, Option<String>)>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&page.scope)?;
        let sql = format!(
            "SELECT p.id, s.slug FROM {pages} p
             LEFT JOIN {slugs} s ON s.{fk} = p.id AND s.lang_code = ?
             WHERE p.lft <= ? AND p.rgt >= ?{clause}
             ORDER BY p.lft",
            pages = self.pages(),
            slugs = self.slugs(),
            fk = self.fk(),
            clause = clause
        );
        let mut params = vec![
            text(lang_code),
            Value::Integer(page.left),
            Value::Integer(page.right),
        ];
        params.extend(scope_params);

        let mut rows = conn
            .query(&sql, positional(params))
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to query slug chain: {}", e)))?;

        let mut chain = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::LibsqlError)? {
            let id: String = row.get(0).map_err(DatabaseError::LibsqlError)?;
            let slug: Option<String> = row.get(1).map_err(DatabaseError::LibsqlError)?;
            chain.push((id, slug));
        }
        Ok(chain)
    }

    //
    // SLUGS
    //

    pub async fn slug_for(
        &self,
        conn: &Connection,
        page_id: &str,
        lang_code: &str,
    ) -> Result<Option<Slug>, PageTreeError> {
        let sql = format!(
            "SELECT {} FROM {} s WHERE s.{} = ? AND s.lang_code = ?",
            self.slug_select,
            self.slugs(),
            self.fk()
        );
        Ok(self
            .query_slugs(conn, &sql, vec![text(page_id), text(lang_code)])
            .await?
            .into_iter()
            .next())
    }

    pub async fn slugs_for_page(&self, conn: &Connection, page_id: &str) -> Result<Vec<Slug>, PageTreeError> {
        let sql = format!(
            "SELECT {} FROM {} s WHERE s.{} = ? ORDER BY s.lang_code",
            self.slug_select,
            self.slugs(),
            self.fk()
        );
        self.query_slugs(conn, &sql, vec![text(page_id)]).await
    }

    /// Every slug of the subtree of `top`, down to `max_depth` if given
    pub async fn subtree_slugs(
        &self,
        conn: &Connection,
        top: &Page,
        max_depth: Option<i64>,
    ) -> Result<Vec<Slug>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&top.scope)?;
        let depth_clause = if max_depth.is_some() { " AND p.depth <= ?" } else { "" };
        let sql = format!(
            "SELECT {select} FROM {slugs} s
             JOIN {pages} p ON p.id = s.{fk}
             WHERE p.lft >= ? AND p.rgt <= ?{clause}{depth_clause}
             ORDER BY p.lft, s.lang_code",
            select = self.slug_select,
            slugs = self.slugs(),
            pages = self.pages(),
            fk = self.fk(),
            clause = clause,
            depth_clause = depth_clause
        );
        let mut params = vec![Value::Integer(top.left), Value::Integer(top.right)];
        params.extend(scope_params);
        if let Some(depth) = max_depth {
            params.push(Value::Integer(depth));
        }
        self.query_slugs(conn, &sql, params).await
    }

    /// Slugs in `lang_code` of the siblings of `page` that equal `candidate`
    /// or start with `candidate{separator}`
    ///
    /// The prefix test uses `substr` rather than `LIKE`, which would be case
    /// insensitive and treat `_` as a wildcard.
    pub async fn sibling_slugs(
        &self,
        conn: &Connection,
        page: &Page,
        lang_code: &str,
        candidate: &str,
    ) -> Result<Vec<String>, PageTreeError> {
        let (clause, scope_params) = self.scope_filter(&page.scope)?;
        let prefix = format!("{}{}", candidate, self.config.slug_separator);
        let sql = format!(
            "SELECT s.slug FROM {slugs} s
             JOIN {pages} p ON p.id = s.{fk}
             WHERE p.parent_id IS ? AND p.id != ? AND s.lang_code = ?
               AND (s.slug = ? OR substr(s.slug, 1, ?) = ?){clause}
             ORDER BY p.lft",
            slugs = self.slugs(),
            pages = self.pages(),
            fk = self.fk(),
            clause = clause
        );
        let mut params = vec![
            opt_text(page.parent_id.clone()),
            text(&page.id),
            text(lang_code),
            text(candidate),
            Value::Integer(prefix.chars().count() as i64),
            text(prefix),
        ];
        params.extend(scope_params);

        let mut rows = conn
            .query(&sql, positional(params))
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to query sibling slugs: {}", e)))?;

        let mut slugs = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::LibsqlError)? {
            slugs.push(row.get::<String>(0).map_err(DatabaseError::LibsqlError)?);
        }
        Ok(slugs)
    }

    pub async fn insert_slug(&self, conn: &Connection, slug: &Slug) -> Result<(), PageTreeError> {
        let sql = format!(
            "INSERT INTO {} (id, {}, lang_code, name, slug, created_at, modified_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            self.slugs(),
            self.fk()
        );
        let result = self
            .execute(
                conn,
                &sql,
                vec![
                    text(&slug.id),
                    text(&slug.page_id),
                    text(&slug.lang_code),
                    text(&slug.name),
                    text(&slug.slug),
                    text(slug.created_at.to_rfc3339()),
                    text(slug.modified_at.to_rfc3339()),
                ],
                "Failed to insert slug",
            )
            .await;

        match result {
            Err(PageTreeError::Database(e)) if e.is_unique_violation() => Err(
                PageTreeError::slug_already_exists(&slug.page_id, &slug.lang_code),
            ),
            other => other.map(|_| ()),
        }
    }

    pub async fn update_slug(&self, conn: &Connection, slug: &Slug) -> Result<(), PageTreeError> {
        let sql = format!(
            "UPDATE {} SET name = ?, slug = ?, modified_at = ? WHERE id = ?",
            self.slugs()
        );
        self.execute(
            conn,
            &sql,
            vec![
                text(&slug.name),
                text(&slug.slug),
                text(slug.modified_at.to_rfc3339()),
                text(&slug.id),
            ],
            "Failed to update slug",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_slug(
        &self,
        conn: &Connection,
        page_id: &str,
        lang_code: &str,
    ) -> Result<u64, PageTreeError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ? AND lang_code = ?",
            self.slugs(),
            self.fk()
        );
        self.execute(conn, &sql, vec![text(page_id), text(lang_code)], "Failed to delete slug")
            .await
    }
}
