//! Text to URL segment conversion
//!
//! The rest of the crate only sees the [`Slugify`] trait, so a caller can plug
//! in any `slugify(text, separator)` function. [`DefaultSlugify`] covers
//! ASCII and the common Latin-1 accents.

/// Turn free text into a URL segment using `separator` between words
pub trait Slugify: Send + Sync {
    fn slugify(&self, text: &str, separator: &str) -> String;
}

impl<F> Slugify for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn slugify(&self, text: &str, separator: &str) -> String {
        self(text, separator)
    }
}

/// Lowercase ASCII slugs
///
/// - ASCII letters and digits are kept (lowercased)
/// - common accented Latin letters are folded to their base letter
/// - `@` reads as `at`
/// - every other run of characters becomes one separator
/// - leading and trailing separators are dropped
///
/// ```rust
/// use pagetree_core::slug::{DefaultSlugify, Slugify};
///
/// assert_eq!(DefaultSlugify.slugify("Root Page", "-"), "root-page");
/// assert_eq!(DefaultSlugify.slugify("  Caffè & Crème  ", "_"), "caffe_creme");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSlugify;

impl Slugify for DefaultSlugify {
    fn slugify(&self, text: &str, separator: &str) -> String {
        let mut slug = String::with_capacity(text.len());
        let mut pending_separator = false;

        let push_word = |slug: &mut String, pending: &mut bool, word: &str| {
            if *pending && !slug.is_empty() {
                slug.push_str(separator);
            }
            slug.push_str(word);
            *pending = false;
        };

        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() {
                let mut buf = [0u8; 4];
                let lower = ch.to_ascii_lowercase();
                push_word(&mut slug, &mut pending_separator, lower.encode_utf8(&mut buf));
            } else if ch == '@' {
                pending_separator = true;
                push_word(&mut slug, &mut pending_separator, "at");
                pending_separator = true;
            } else if let Some(folded) = fold_latin(ch) {
                push_word(&mut slug, &mut pending_separator, folded);
            } else {
                pending_separator = true;
            }
        }

        slug
    }
}

fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch.to_lowercase().next()? {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}
