//! Page Tree Configuration
//!
//! Explicit configuration passed to the store and services at construction
//! time. Nothing in the crate reads global state.
//!
//! # Examples
//!
//! ```rust
//! use pagetree_core::config::{PageTreeConfig, SuffixPolicy};
//!
//! let config = PageTreeConfig::default()
//!     .with_scope_columns(vec!["type".to_string()])
//!     .with_suffix_policy(SuffixPolicy::custom(|_slug, _sep, _taken| "copy".to_string()));
//!
//! assert!(config.validate().is_ok());
//! assert!(config.is_scoped());
//! ```

use crate::services::error::PageTreeError;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Column names owned by the pages table; scope columns may not reuse them.
const RESERVED_PAGE_COLUMNS: &[&str] = &[
    "id",
    "parent_id",
    "lft",
    "rgt",
    "depth",
    "created_at",
    "modified_at",
];

/// Signature of a caller-supplied suffix generator.
///
/// Receives the colliding candidate slug, the separator and every sibling slug
/// that collided with the candidate. The returned string is appended verbatim.
pub type SuffixFn = dyn Fn(&str, &str, &[String]) -> String + Send + Sync;

/// Strategy used to make a colliding slug unique
#[derive(Clone, Default)]
pub enum SuffixPolicy {
    /// Append `max(existing numeric suffix) + 1`
    #[default]
    Numeric,

    /// Append whatever the function returns
    Custom(Arc<SuffixFn>),
}

impl SuffixPolicy {
    /// Wrap a closure as a custom suffix policy
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &str, &[String]) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for SuffixPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("Numeric"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

fn default_pages_table() -> String {
    "pages".to_string()
}

fn default_slugs_table() -> String {
    "slugs".to_string()
}

fn default_page_foreign_key() -> String {
    "page_id".to_string()
}

fn default_slug_separator() -> String {
    "-".to_string()
}

/// Configuration for the page tree store and services
///
/// Deserializable from JSON; every field has a default. A custom suffix
/// function cannot be expressed in JSON and is attached with
/// [`PageTreeConfig::with_suffix_policy`].
#[derive(Debug, Clone, Deserialize)]
pub struct PageTreeConfig {
    /// Table holding the nested-set nodes
    #[serde(default = "default_pages_table")]
    pub pages_table: String,

    /// Table holding the localized slugs
    #[serde(default = "default_slugs_table")]
    pub slugs_table: String,

    /// Foreign key column on the slugs table pointing at the owning page
    #[serde(default = "default_page_foreign_key")]
    pub page_foreign_key: String,

    /// Columns partitioning the pages into independent trees (empty = unscoped)
    #[serde(default)]
    pub scope_columns: Vec<String>,

    /// Separator handed to slugify and used between a slug and its suffix
    #[serde(default = "default_slug_separator")]
    pub slug_separator: String,

    /// Named suffix policy from a config file: absent or `"numeric"`
    #[serde(default, rename = "slug_suffix")]
    pub slug_suffix_name: Option<String>,

    /// Resolved suffix policy
    #[serde(skip)]
    pub suffix_policy: SuffixPolicy,
}

impl Default for PageTreeConfig {
    fn default() -> Self {
        Self {
            pages_table: default_pages_table(),
            slugs_table: default_slugs_table(),
            page_foreign_key: default_page_foreign_key(),
            scope_columns: Vec::new(),
            slug_separator: default_slug_separator(),
            slug_suffix_name: None,
            suffix_policy: SuffixPolicy::Numeric,
        }
    }
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid")
    })
}

impl PageTreeConfig {
    /// Parse a configuration from JSON and validate it
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the JSON is malformed, names an unknown
    /// suffix policy, or fails [`PageTreeConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, PageTreeError> {
        let mut config: Self = serde_json::from_str(json).map_err(|e| {
            PageTreeError::configuration(format!("Invalid page tree configuration: {}", e))
        })?;

        config.suffix_policy = match config.slug_suffix_name.as_deref() {
            None | Some("numeric") => SuffixPolicy::Numeric,
            Some(other) => {
                return Err(PageTreeError::configuration(format!(
                    "Slug suffix '{}' is neither absent nor a known policy; \
                     attach a function with with_suffix_policy()",
                    other
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Set the scope columns
    pub fn with_scope_columns(mut self, columns: Vec<String>) -> Self {
        self.scope_columns = columns;
        self
    }

    /// Set the slug separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.slug_separator = separator.into();
        self
    }

    /// Set the suffix policy
    pub fn with_suffix_policy(mut self, policy: SuffixPolicy) -> Self {
        self.slug_suffix_name = None;
        self.suffix_policy = policy;
        self
    }

    /// Whether pages are partitioned into scoped trees
    pub fn is_scoped(&self) -> bool {
        !self.scope_columns.is_empty()
    }

    /// Check identifiers and separator before they reach any SQL
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for:
    /// - table or column names that are not plain SQL identifiers
    /// - the pages and slugs tables sharing a name
    /// - scope columns that are duplicated or clash with page columns
    /// - an empty separator
    /// - a named suffix policy that was never resolved
    pub fn validate(&self) -> Result<(), PageTreeError> {
        let identifiers = [
            ("pages_table", &self.pages_table),
            ("slugs_table", &self.slugs_table),
            ("page_foreign_key", &self.page_foreign_key),
        ];
        for (field, value) in identifiers {
            if !identifier_regex().is_match(value) {
                return Err(PageTreeError::configuration(format!(
                    "{} '{}' is not a valid SQL identifier",
                    field, value
                )));
            }
        }

        if self.pages_table == self.slugs_table {
            return Err(PageTreeError::configuration(
                "pages_table and slugs_table must differ",
            ));
        }

        for (i, column) in self.scope_columns.iter().enumerate() {
            if !identifier_regex().is_match(column) {
                return Err(PageTreeError::configuration(format!(
                    "Scope column '{}' is not a valid SQL identifier",
                    column
                )));
            }
            if RESERVED_PAGE_COLUMNS.contains(&column.as_str()) {
                return Err(PageTreeError::configuration(format!(
                    "Scope column '{}' clashes with a page column",
                    column
                )));
            }
            if self.scope_columns[..i].contains(column) {
                return Err(PageTreeError::configuration(format!(
                    "Scope column '{}' is listed twice",
                    column
                )));
            }
        }

        if self.slug_separator.is_empty() {
            return Err(PageTreeError::configuration(
                "slug_separator must not be empty",
            ));
        }

        if let Some(name) = &self.slug_suffix_name {
            if name != "numeric" {
                return Err(PageTreeError::configuration(format!(
                    "Slug suffix '{}' is neither absent nor a known policy",
                    name
                )));
            }
        }

        Ok(())
    }
}
