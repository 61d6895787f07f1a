//! Slug Data Structures
//!
//! A slug is the localized name and URL segment of one page in one language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Localized name + URL segment of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slug {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning page
    pub page_id: String,

    /// Short language identifier (e.g. "en")
    pub lang_code: String,

    /// Display text
    pub name: String,

    /// URL segment, unique among sibling pages in this language
    pub slug: String,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

/// Input for creating the slug of a page in one language
///
/// # Examples
///
/// ```rust
/// use pagetree_core::models::NewSlug;
///
/// // Slug derived from the name: "root-page"
/// let derived = NewSlug::new("en", "root page");
///
/// // Explicit slug override: "different-slug"
/// let explicit = NewSlug::new("en", "root page").with_slug("different slug");
/// assert_eq!(explicit.slug.as_deref(), Some("different slug"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlug {
    pub lang_code: String,

    pub name: String,

    /// Explicit slug; slugified before use. When None the name is slugified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl NewSlug {
    pub fn new(lang_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            lang_code: lang_code.into(),
            name: name.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Partial update of an existing slug record
///
/// Only provided fields are considered. A field equal to the stored value is
/// not a change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl SlugChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none()
    }
}
