//! Slug generation
//!
//! - `Slugify` / `DefaultSlugify` - text to URL segment
//! - `UniqueSlugGenerator` - suffixing against sibling slugs

mod slugify;
mod unique;

pub use slugify::{DefaultSlugify, Slugify};
pub use unique::UniqueSlugGenerator;
