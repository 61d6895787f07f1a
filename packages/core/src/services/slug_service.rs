//! Slug Service - Slug Lifecycle
//!
//! Creates, updates and deletes the per-language slugs of pages, keeping each
//! slug unique among the slugs of sibling pages in the same language.
//!
//! # Slugging Rules
//!
//! A slug value is (re)computed when:
//!
//! - the record is new: from the explicit slug if given, else from the name
//! - an explicit slug differs from the stored one: from that slug
//! - otherwise, the name differs from the stored one: from the name
//!
//! Anything else leaves the stored slug untouched. The computed candidate is
//! slugified and then made unique against the sibling slugs, which are read
//! inside the same write transaction as the insert or update.

use crate::db::{DatabaseService, PageStore};
use crate::models::{NewSlug, Page, Slug, SlugChanges};
use crate::services::error::PageTreeError;
use crate::slug::{DefaultSlugify, Slugify, UniqueSlugGenerator};
use chrono::Utc;
use libsql::Connection;
use std::fmt;
use std::sync::Arc;

/// Text that should be slugified for a save, if any
fn slug_source(existing: Option<&Slug>, changes: &SlugChanges) -> Option<String> {
    match existing {
        None => changes.slug.clone().or_else(|| changes.name.clone()),
        Some(stored) => {
            if let Some(slug) = changes.slug.as_ref().filter(|s| **s != stored.slug) {
                Some(slug.clone())
            } else {
                changes.name.clone().filter(|n| *n != stored.name)
            }
        }
    }
}

#[derive(Clone)]
pub struct SlugService {
    store: Arc<PageStore>,
    slugifier: Arc<dyn Slugify>,
    generator: UniqueSlugGenerator,
}

impl fmt::Debug for SlugService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugService")
            .field("store", &self.store)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

impl SlugService {
    /// Create the service with [`DefaultSlugify`] and the configured suffix policy
    pub fn new(store: Arc<PageStore>) -> Self {
        let config = store.config();
        let generator =
            UniqueSlugGenerator::new(config.slug_separator.clone(), config.suffix_policy.clone());
        Self {
            store,
            slugifier: Arc::new(DefaultSlugify),
            generator,
        }
    }

    /// Replace the slugifier
    ///
    /// ```rust,no_run
    /// # use pagetree_core::services::SlugService;
    /// # fn demo(service: SlugService) -> SlugService {
    /// service.with_slugifier(|text: &str, sep: &str| text.to_lowercase().replace(' ', sep))
    /// # }
    /// ```
    pub fn with_slugifier(mut self, slugifier: impl Slugify + 'static) -> Self {
        self.slugifier = Arc::new(slugifier);
        self
    }

    fn db(&self) -> &DatabaseService {
        self.store.db()
    }

    /// Unique slug for `page` in `lang_code`, or None if nothing triggers slugging
    async fn prepare_on(
        &self,
        conn: &Connection,
        page: &Page,
        lang_code: &str,
        existing: Option<&Slug>,
        changes: &SlugChanges,
    ) -> Result<Option<String>, PageTreeError> {
        let Some(source) = slug_source(existing, changes) else {
            return Ok(None);
        };

        let candidate = self
            .slugifier
            .slugify(&source, self.generator.separator());
        let siblings = self
            .store
            .sibling_slugs(conn, page, lang_code, &candidate)
            .await?;
        let unique = self.generator.make_unique(
            &candidate,
            &siblings,
            existing.map(|s| s.slug.as_str()),
        );

        tracing::debug!(
            "Prepared slug '{}' for page {} ({}) from '{}'",
            unique,
            page.id,
            lang_code,
            source
        );
        Ok(Some(unique))
    }

    /// The slug a save with `changes` would persist, without writing anything
    ///
    /// Returns `None` when the changes do not trigger slugging.
    pub async fn prepare_slug(
        &self,
        page_id: &str,
        lang_code: &str,
        changes: &SlugChanges,
    ) -> Result<Option<String>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Option<String>, PageTreeError> = async {
            let page = self.store.require_page(&conn, page_id).await?;
            let existing = self.store.slug_for(&conn, page_id, lang_code).await?;
            self.prepare_on(&conn, &page, lang_code, existing.as_ref(), changes)
                .await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }

    /// Add the slug of a page in one language
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if the page does not exist
    /// - `SlugAlreadyExists` if the page already has a slug in that language
    pub async fn create_slug(&self, page_id: &str, new_slug: NewSlug) -> Result<Slug, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.create_slug_in(&conn, page_id, new_slug).await;
        self.db().finish(&conn, result).await
    }

    async fn create_slug_in(
        &self,
        conn: &Connection,
        page_id: &str,
        new_slug: NewSlug,
    ) -> Result<Slug, PageTreeError> {
        let page = self.store.require_page(conn, page_id).await?;
        if self
            .store
            .slug_for(conn, page_id, &new_slug.lang_code)
            .await?
            .is_some()
        {
            return Err(PageTreeError::slug_already_exists(page_id, &new_slug.lang_code));
        }

        let changes = SlugChanges {
            name: Some(new_slug.name.clone()),
            slug: new_slug.slug.clone(),
        };
        let value = self
            .prepare_on(conn, &page, &new_slug.lang_code, None, &changes)
            .await?
            .unwrap_or_default();

        let now = Utc::now();
        let slug = Slug {
            id: uuid::Uuid::new_v4().to_string(),
            page_id: page.id,
            lang_code: new_slug.lang_code,
            name: new_slug.name,
            slug: value,
            created_at: now,
            modified_at: now,
        };
        self.store.insert_slug(conn, &slug).await?;

        tracing::info!(
            "Created slug '{}' for page {} ({})",
            slug.slug,
            slug.page_id,
            slug.lang_code
        );
        Ok(slug)
    }

    /// Apply name and/or slug changes to an existing slug record
    ///
    /// Values equal to the stored ones are not changes; if nothing changes,
    /// the stored record is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// - `PageNotFound` if the page does not exist
    /// - `SlugNotFound` if the page has no slug in `lang_code`
    pub async fn update_slug(
        &self,
        page_id: &str,
        lang_code: &str,
        changes: SlugChanges,
    ) -> Result<Slug, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_immediate(&conn).await?;
        let result = self.update_slug_in(&conn, page_id, lang_code, changes).await;
        self.db().finish(&conn, result).await
    }

    async fn update_slug_in(
        &self,
        conn: &Connection,
        page_id: &str,
        lang_code: &str,
        changes: SlugChanges,
    ) -> Result<Slug, PageTreeError> {
        let page = self.store.require_page(conn, page_id).await?;
        let stored = self
            .store
            .slug_for(conn, page_id, lang_code)
            .await?
            .ok_or_else(|| PageTreeError::slug_not_found(page_id, lang_code))?;

        let name = changes.name.clone().unwrap_or_else(|| stored.name.clone());
        let slug = self
            .prepare_on(conn, &page, lang_code, Some(&stored), &changes)
            .await?
            .unwrap_or_else(|| stored.slug.clone());

        if name == stored.name && slug == stored.slug {
            tracing::debug!("No slug changes for page {} ({})", page_id, lang_code);
            return Ok(stored);
        }

        let updated = Slug {
            name,
            slug,
            modified_at: Utc::now(),
            ..stored
        };
        self.store.update_slug(conn, &updated).await?;

        tracing::info!(
            "Updated slug of page {} ({}) to '{}'",
            page_id,
            lang_code,
            updated.slug
        );
        Ok(updated)
    }

    /// Remove the slug of a page in one language
    ///
    /// # Errors
    ///
    /// `SlugNotFound` if there is no such slug.
    pub async fn delete_slug(&self, page_id: &str, lang_code: &str) -> Result<(), PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        let deleted = self.store.delete_slug(&conn, page_id, lang_code).await?;
        if deleted == 0 {
            return Err(PageTreeError::slug_not_found(page_id, lang_code));
        }
        tracing::info!("Deleted slug of page {} ({})", page_id, lang_code);
        Ok(())
    }

    pub async fn get_slug_record(&self, page_id: &str, lang_code: &str) -> Result<Slug, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.store
            .slug_for(&conn, page_id, lang_code)
            .await?
            .ok_or_else(|| PageTreeError::slug_not_found(page_id, lang_code))
    }

    /// All slugs of a page, ordered by language code
    pub async fn slugs_for_page(&self, page_id: &str) -> Result<Vec<Slug>, PageTreeError> {
        let conn = self.db().connect_with_timeout().await?;
        self.db().begin_read(&conn).await?;
        let result: Result<Vec<Slug>, PageTreeError> = async {
            self.store.require_page(&conn, page_id).await?;
            self.store.slugs_for_page(&conn, page_id).await
        }
        .await;
        self.db().finish_read(&conn, result).await
    }
}
