//! Lookup Service - URL Resolution
//!
//! Resolves hierarchical URLs (`/home/about/team`) to pages and builds URLs
//! back from pages. A URL is the chain of slugs from the scope's root down to
//! the page, in one language.
//!
//! Two resolvers are provided and agree on every valid tree:
//!
//! - [`LookupService::lookup`] materializes the root's subtree down to the
//!   URL's depth and walks it level by level
//! - [`LookupService::match_url`] queries pages holding the last segment and
//!   checks each candidate's ancestor chain
//!
//! An empty path (`""` or `"/"`) is the scope's root in any language. A
//! trailing slash yields an empty last segment, which never matches.
//!
//! Every read that takes more than one statement runs inside one read
//! transaction, so the bounds it reads first still hold for the slugs and
//! chains it reads after.

use crate::db::{DatabaseService, PageStore};
use crate::models::{Page, Scope, Slug};
use crate::services::error::PageTreeError;
use crate::tree::Hierarchy;
use libsql::Connection;
use std::sync::Arc;

/// Split a URL path into slug tokens
///
/// One leading `/` is ignored; an empty remainder means "the root".
fn tokenize(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

#[derive(Debug, Clone)]
pub struct LookupService {
    store: Arc<PageStore>,
}

impl LookupService {
    pub fn new(store: Arc<PageStore>) -> Self {
        Self { store }
    }

    fn db(&self) -> &DatabaseService {
        self.store.db()
    }

    fn normalize(&self, scope: &Scope) -> Result<Scope, PageTreeError> {
        scope.normalized(&self.store.config().scope_columns)
    }

    /// Resolve `path` in `lang_code` by walking the materialized tree
    ///
    /// # Errors
    ///
    /// `UrlNotFound` if the scope has no root or any segment fails to match.
    pub async fn lookup(&self, path: &str, lang_code: &str, scope: &Scope) -> Result<Page, PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result = self.lookup_in(&conn, path, lang_code, &scope).await;
        self.db().finish_read(&conn, result).await
    }

    async fn lookup_in(
        &self,
        conn: &Connection,
        path: &str,
        lang_code: &str,
        scope: &Scope,
    ) -> Result<Page, PageTreeError> {
        let not_found = || PageTreeError::url_not_found(path, lang_code);
        let root = self
            .store
            .root_of_scope(conn, scope)
            .await?
            .ok_or_else(not_found)?;

        let tokens = tokenize(path);
        if tokens.is_empty() {
            return Ok(root);
        }
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(not_found());
        }

        let max_depth = root.depth + tokens.len() as i64 - 1;
        let pages = self
            .store
            .descendants(conn, &root, true, Some(max_depth))
            .await?;
        let slugs = self
            .store
            .subtree_slugs(conn, &root, Some(max_depth))
            .await?;

        tracing::debug!(
            "Lookup of '{}' ({}) materialized {} pages and {} slugs",
            path,
            lang_code,
            pages.len(),
            slugs.len()
        );

        let hierarchy = Hierarchy::new(pages, slugs);
        hierarchy
            .resolve(&tokens, lang_code)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Resolve `path` in `lang_code` by candidate query plus chain check
    ///
    /// # Errors
    ///
    /// `UrlNotFound` if no candidate's ancestor chain spells the path.
    pub async fn match_url(&self, path: &str, lang_code: &str, scope: &Scope) -> Result<Page, PageTreeError> {
        let scope = self.normalize(scope)?;
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result = self.match_url_in(&conn, path, lang_code, &scope).await;
        self.db().finish_read(&conn, result).await
    }

    async fn match_url_in(
        &self,
        conn: &Connection,
        path: &str,
        lang_code: &str,
        scope: &Scope,
    ) -> Result<Page, PageTreeError> {
        let not_found = || PageTreeError::url_not_found(path, lang_code);
        let tokens = tokenize(path);
        if tokens.is_empty() {
            return self
                .store
                .root_of_scope(conn, scope)
                .await?
                .ok_or_else(not_found);
        }
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(not_found());
        }

        let depth = tokens.len() as i64 - 1;
        let last = tokens[tokens.len() - 1];
        let candidates = self
            .store
            .match_candidates(conn, scope, lang_code, last, depth)
            .await?;

        for candidate in candidates {
            let chain = self.store.chain_slugs(conn, &candidate, lang_code).await?;
            let spells_path = chain.len() == tokens.len()
                && chain
                    .iter()
                    .zip(&tokens)
                    .all(|((_, slug), token)| slug.as_deref() == Some(*token));
            if spells_path {
                return Ok(candidate);
            }
        }

        Err(not_found())
    }

    /// Build the URL of a page in `lang_code`
    ///
    /// `lang_prefix` prepends `/{lang_code}`.
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if the page does not exist
    /// - `MissingSlugForLanguage` naming the first page on the chain that has
    ///   no slug in `lang_code`
    pub async fn get_url(&self, page_id: &str, lang_code: &str, lang_prefix: bool) -> Result<String, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result = self.get_url_in(&conn, page_id, lang_code, lang_prefix).await;
        self.db().finish_read(&conn, result).await
    }

    async fn get_url_in(
        &self,
        conn: &Connection,
        page_id: &str,
        lang_code: &str,
        lang_prefix: bool,
    ) -> Result<String, PageTreeError> {
        let page = self.store.require_page(conn, page_id).await?;
        let chain = self.store.chain_slugs(conn, &page, lang_code).await?;

        let mut url = String::new();
        if lang_prefix {
            url.push('/');
            url.push_str(lang_code);
        }
        for (id, slug) in chain {
            let slug = slug.ok_or_else(|| PageTreeError::missing_slug_for_language(id, lang_code))?;
            url.push('/');
            url.push_str(&slug);
        }
        Ok(url)
    }

    /// Display name of a page in `lang_code`
    pub async fn get_name(&self, page_id: &str, lang_code: &str) -> Result<String, PageTreeError> {
        Ok(self.existing_slug(page_id, lang_code).await?.name)
    }

    /// URL segment of a page in `lang_code`
    pub async fn get_slug(&self, page_id: &str, lang_code: &str) -> Result<String, PageTreeError> {
        Ok(self.existing_slug(page_id, lang_code).await?.slug)
    }

    async fn existing_slug(&self, page_id: &str, lang_code: &str) -> Result<Slug, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Slug, PageTreeError> = async {
            self.store.require_page(&conn, page_id).await?;
            self.store
                .slug_for(&conn, page_id, lang_code)
                .await?
                .ok_or_else(|| PageTreeError::slug_not_found(page_id, lang_code))
        }
        .await;
        self.db().finish_read(&conn, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("/").is_empty());
        assert_eq!(tokenize("home"), vec!["home"]);
        assert_eq!(tokenize("/home/about"), vec!["home", "about"]);
        assert_eq!(tokenize("home/about/"), vec!["home", "about", ""]);
        assert_eq!(tokenize("//home"), vec!["", "home"]);
    }
}
