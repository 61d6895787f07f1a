//! Adjacency view of a materialized subtree
//!
//! Built from pages read in `left` order, so every child list comes out in
//! document order without sorting. Lookup reduction and `PageTree` assembly
//! both walk this structure iteratively.

use crate::models::{Page, PageTree, Slug};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pages: Vec<Page>,
    index: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
    slugs: HashMap<String, Vec<Slug>>,
}

impl Hierarchy {
    /// Build from a `left`-ordered walk of one subtree plus the slugs of its pages
    ///
    /// The first page is the top of the hierarchy. Pages whose parent is not
    /// part of the walk are ignored, which keeps depth-limited reads valid.
    pub fn new(mut pages: Vec<Page>, slugs: Vec<Slug>) -> Self {
        pages.sort_by_key(|p| p.left);

        let mut index = HashMap::with_capacity(pages.len());
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, page) in pages.iter().enumerate() {
            if let Some(parent_id) = &page.parent_id {
                if index.contains_key(parent_id) {
                    children.entry(parent_id.clone()).or_default().push(i);
                }
            }
            index.insert(page.id.clone(), i);
        }

        let mut by_page: HashMap<String, Vec<Slug>> = HashMap::new();
        for slug in slugs {
            by_page.entry(slug.page_id.clone()).or_default().push(slug);
        }

        Self {
            pages,
            index,
            children,
            slugs: by_page,
        }
    }

    pub fn top(&self) -> Option<&Page> {
        self.pages.first()
    }

    pub fn get(&self, id: &str) -> Option<&Page> {
        self.index.get(id).map(|&i| &self.pages[i])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Children of a page in `left` order
    pub fn children(&self, id: &str) -> impl Iterator<Item = &Page> + '_ {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.pages[i])
    }

    pub fn slug(&self, page_id: &str, lang_code: &str) -> Option<&Slug> {
        self.slugs
            .get(page_id)
            .and_then(|slugs| slugs.iter().find(|s| s.lang_code == lang_code))
    }

    /// Follow `tokens` down from the top page, one level per token
    ///
    /// The first token has to match the top page's own slug; each following
    /// token is matched against the children of the previous match. Among
    /// equal sibling slugs the first in `left` order wins.
    pub fn resolve(&self, tokens: &[&str], lang_code: &str) -> Option<&Page> {
        let top = self.top()?;
        let mut candidates: Vec<&Page> = vec![top];
        let mut matched: Option<&Page> = None;

        for (level, token) in tokens.iter().enumerate() {
            let hit = candidates.iter().copied().find(|page| {
                self.slug(&page.id, lang_code)
                    .is_some_and(|s| s.slug == *token)
            });

            let Some(page) = hit else {
                tracing::debug!(level, token = %token, lang_code, "No candidate matched token");
                return None;
            };

            matched = Some(page);
            candidates = self.children(&page.id).collect();
        }

        matched
    }

    /// Assemble the nested `PageTree` of the top page
    ///
    /// Pages are folded bottom-up in reverse `left` order, so every child tree
    /// is complete before its parent is built.
    pub fn into_page_tree(mut self) -> Option<PageTree> {
        let mut built: HashMap<String, PageTree> = HashMap::with_capacity(self.pages.len());

        for i in (0..self.pages.len()).rev() {
            let page = self.pages[i].clone();
            let children: Vec<PageTree> = self
                .children
                .get(&page.id)
                .map(|idxs| {
                    idxs.iter()
                        .filter_map(|&c| built.remove(&self.pages[c].id))
                        .collect()
                })
                .unwrap_or_default();
            let slugs = self.slugs.remove(&page.id).unwrap_or_default();

            built.insert(
                page.id.clone(),
                PageTree {
                    page,
                    slugs,
                    children,
                },
            );
        }

        let top_id = self.pages.first()?.id.clone();
        built.remove(&top_id)
    }
}
