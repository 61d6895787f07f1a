//! Service Layer Error Types
//!
//! Every rule violation of the page tree is a distinct variant so callers can
//! match on it. None of them is swallowed inside the crate.

use crate::db::DatabaseError;
use crate::models::Scope;
use thiserror::Error;

/// Page tree operation errors
#[derive(Error, Debug)]
pub enum PageTreeError {
    /// A second root was requested for a scope that already has one
    #[error("A root page already exists for scope {scope}")]
    RootConflict { scope: Scope },

    /// Child and parent belong to different scoped trees
    #[error("Scope mismatch: parent {parent_id} is in {expected}, child requested {actual}")]
    ScopeMismatch {
        parent_id: String,
        expected: Scope,
        actual: Scope,
    },

    /// The move would corrupt the tree (self target, own subtree, other scope)
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// The move would leave two roots in one scope
    #[error("Move not possible: {0}")]
    MoveConflict(String),

    /// Page not found by ID
    #[error("Page not found: {id}")]
    PageNotFound { id: String },

    /// Page has no slug in the requested language
    #[error("Page {page_id} has no slug for language '{lang_code}'")]
    SlugNotFound { page_id: String, lang_code: String },

    /// No page matches the URL in the requested language and scope
    #[error("No page matches '{path}' for language '{lang_code}'")]
    UrlNotFound { path: String, lang_code: String },

    /// A page on the ancestor chain cannot be localized
    #[error("The page {page_id} does not have a slug for language '{lang_code}'")]
    MissingSlugForLanguage { page_id: String, lang_code: String },

    /// A page may have at most one slug per language
    #[error("Page {page_id} already has a slug for language '{lang_code}'")]
    SlugAlreadyExists { page_id: String, lang_code: String },

    /// Invalid configuration (identifiers, separator, suffix policy)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),
}

impl PageTreeError {
    /// Create a root conflict error
    pub fn root_conflict(scope: Scope) -> Self {
        Self::RootConflict { scope }
    }

    /// Create a scope mismatch error
    pub fn scope_mismatch(parent_id: impl Into<String>, expected: Scope, actual: Scope) -> Self {
        Self::ScopeMismatch {
            parent_id: parent_id.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid move error
    pub fn invalid_move(msg: impl Into<String>) -> Self {
        Self::InvalidMove(msg.into())
    }

    /// Create a move conflict error
    pub fn move_conflict(msg: impl Into<String>) -> Self {
        Self::MoveConflict(msg.into())
    }

    /// Create a page not found error
    pub fn page_not_found(id: impl Into<String>) -> Self {
        Self::PageNotFound { id: id.into() }
    }

    /// Create a slug not found error
    pub fn slug_not_found(page_id: impl Into<String>, lang_code: impl Into<String>) -> Self {
        Self::SlugNotFound {
            page_id: page_id.into(),
            lang_code: lang_code.into(),
        }
    }

    /// Create a URL not found error
    pub fn url_not_found(path: impl Into<String>, lang_code: impl Into<String>) -> Self {
        Self::UrlNotFound {
            path: path.into(),
            lang_code: lang_code.into(),
        }
    }

    /// Create a missing slug for language error
    pub fn missing_slug_for_language(
        page_id: impl Into<String>,
        lang_code: impl Into<String>,
    ) -> Self {
        Self::MissingSlugForLanguage {
            page_id: page_id.into(),
            lang_code: lang_code.into(),
        }
    }

    /// Create a slug already exists error
    pub fn slug_already_exists(page_id: impl Into<String>, lang_code: impl Into<String>) -> Self {
        Self::SlugAlreadyExists {
            page_id: page_id.into(),
            lang_code: lang_code.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// True for every "nothing matched" condition (page, slug or URL)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PageNotFound { .. } | Self::SlugNotFound { .. } | Self::UrlNotFound { .. }
        )
    }
}
