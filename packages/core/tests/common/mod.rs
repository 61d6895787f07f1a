//! Shared setup for the integration tests

#![allow(dead_code)]

use anyhow::Result;
use pagetree_core::config::PageTreeConfig;
use pagetree_core::db::{DatabaseService, PageStore};
use pagetree_core::models::{NewSlug, Page, Scope};
use pagetree_core::services::{LookupService, PageTreeService, SlugService};
use std::sync::Arc;
use tempfile::TempDir;

pub const LANG: &str = "en";

pub struct TestEnv {
    pub tree: PageTreeService,
    pub lookup: LookupService,
    pub slugs: SlugService,
    pub store: Arc<PageStore>,
    _temp_dir: TempDir,
}

/// Test helper: Create a test environment with the default configuration
pub async fn create_test_env() -> Result<TestEnv> {
    create_test_env_with(PageTreeConfig::default()).await
}

/// Test helper: Create a test environment scoped on a `type` column
pub async fn create_scoped_test_env() -> Result<TestEnv> {
    create_test_env_with(PageTreeConfig::default().with_scope_columns(vec!["type".to_string()]))
        .await
}

/// Test helper: Route `tracing` output to the test writer
///
/// Honors `RUST_LOG`; defaults to warnings only. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub async fn create_test_env_with(config: PageTreeConfig) -> Result<TestEnv> {
    init_tracing();
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(DatabaseService::new(db_path).await?);
    let store = Arc::new(PageStore::new(db, config).await?);

    Ok(TestEnv {
        tree: PageTreeService::new(store.clone()),
        lookup: LookupService::new(store.clone()),
        slugs: SlugService::new(store.clone()),
        store,
        _temp_dir: temp_dir,
    })
}

pub fn generic() -> Scope {
    Scope::unscoped().with("type", "generic")
}

impl TestEnv {
    /// Root page of `scope` with a slug named `name` in [`LANG`]
    pub async fn root_named(&self, scope: &Scope, name: &str) -> Result<Page> {
        let page = self.tree.create_root(scope).await?;
        self.slugs.create_slug(&page.id, NewSlug::new(LANG, name)).await?;
        Ok(page)
    }

    /// Last child of `parent` with a slug named `name` in [`LANG`]
    pub async fn child_named(&self, parent: &Page, name: &str) -> Result<Page> {
        let page = self.tree.create_child(&parent.id, &parent.scope).await?;
        self.slugs.create_slug(&page.id, NewSlug::new(LANG, name)).await?;
        Ok(page)
    }

    pub async fn url(&self, page: &Page) -> Result<String> {
        Ok(self.lookup.get_url(&page.id, LANG, false).await?)
    }

    pub async fn reload(&self, page: &Page) -> Result<Page> {
        Ok(self.tree.get_page(&page.id).await?)
    }

    /// `(id, left, right, depth)` of every page under `top`, in tree order
    pub async fn bounds_under(&self, top: &Page) -> Result<Vec<(String, i64, i64, i64)>> {
        Ok(self
            .tree
            .descendants_and_self(&top.id)
            .await?
            .iter()
            .map(|p| (p.id.clone(), p.left, p.right, p.depth))
            .collect())
    }
}
