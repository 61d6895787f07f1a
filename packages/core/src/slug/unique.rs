//! Sibling-unique slug generation
//!
//! Pure: the caller reads the sibling slugs (same parent, same scope, same
//! language, excluding the page itself) and hands them in.

use crate::config::SuffixPolicy;
use std::collections::HashSet;

/// Resolves a candidate slug against the slugs of sibling pages
///
/// # Examples
///
/// ```rust
/// use pagetree_core::config::SuffixPolicy;
/// use pagetree_core::slug::UniqueSlugGenerator;
///
/// let generator = UniqueSlugGenerator::new("-", SuffixPolicy::Numeric);
/// let siblings = vec!["root-page".to_string(), "root-page-1".to_string()];
///
/// assert_eq!(generator.make_unique("root-page", &siblings, None), "root-page-2");
/// assert_eq!(generator.make_unique("other", &siblings, None), "other");
/// ```
#[derive(Debug, Clone)]
pub struct UniqueSlugGenerator {
    separator: String,
    policy: SuffixPolicy,
}

impl UniqueSlugGenerator {
    pub fn new(separator: impl Into<String>, policy: SuffixPolicy) -> Self {
        Self {
            separator: separator.into(),
            policy,
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Sibling slugs equal to `candidate` or of the form `candidate{sep}...`
    pub fn collisions(&self, candidate: &str, siblings: &[String]) -> Vec<String> {
        let prefix = format!("{}{}", candidate, self.separator);
        siblings
            .iter()
            .filter(|s| s.as_str() == candidate || s.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Return `candidate`, or a suffixed form of it no sibling holds
    ///
    /// `current` is the slug the page holds right now in this language, if
    /// any. When it is already a suffixed form of `candidate` and still free,
    /// it is kept so an unrelated update does not renumber the page.
    pub fn make_unique(&self, candidate: &str, siblings: &[String], current: Option<&str>) -> String {
        let collisions = self.collisions(candidate, siblings);
        if !collisions.iter().any(|s| s == candidate) {
            return candidate.to_string();
        }

        let prefix = format!("{}{}", candidate, self.separator);
        if let Some(current) = current {
            if current.starts_with(&prefix) && !collisions.iter().any(|s| s == current) {
                tracing::debug!(candidate, current, "Keeping existing suffixed slug");
                return current.to_string();
            }
        }

        let suffix = match &self.policy {
            SuffixPolicy::Numeric => self.next_number(&prefix, &collisions).to_string(),
            SuffixPolicy::Custom(f) => f(candidate, &self.separator, &collisions),
        };

        let unique = format!("{}{}", prefix, suffix);
        tracing::debug!(candidate, unique = %unique, taken = collisions.len(), "Suffixed colliding slug");
        unique
    }

    /// `max(leading number after prefix) + 1`, with non-numeric entries as 0
    ///
    /// When the maximum is already `u64::MAX` the smallest positive number
    /// whose suffixed form no sibling holds is used instead.
    fn next_number(&self, prefix: &str, collisions: &[String]) -> u64 {
        let max = collisions
            .iter()
            .map(|s| {
                let rest = s.strip_prefix(prefix).unwrap_or("");
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<u64>().unwrap_or(0)
            })
            .max()
            .unwrap_or(0);

        max.checked_add(1).unwrap_or_else(|| {
            let taken: HashSet<&str> = collisions.iter().map(String::as_str).collect();
            (1..=u64::MAX)
                .find(|n| !taken.contains(format!("{}{}", prefix, n).as_str()))
                .unwrap_or(0)
        })
    }
}
