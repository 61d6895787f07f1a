//! Integration tests for page and slug creation
//!
//! Tests cover:
//! - Root and child creation with slugs
//! - URL building with and without the language prefix
//! - Sibling slug collisions (numeric and custom suffixes)
//! - Duplicate languages and missing translations

mod common;

use anyhow::Result;
use common::{create_test_env, create_test_env_with, LANG};
use pagetree_core::config::{PageTreeConfig, SuffixPolicy};
use pagetree_core::models::{NewSlug, Scope};
use pagetree_core::services::PageTreeError;

#[tokio::test]
async fn test_root_page_gets_first_bounds() -> Result<()> {
    let env = create_test_env().await?;

    let root = env.tree.create_root(&Scope::unscoped()).await?;
    assert_eq!((root.left, root.right, root.depth), (1, 2, 0));
    assert!(root.parent_id.is_none());
    Ok(())
}

#[tokio::test]
async fn test_second_root_is_rejected() -> Result<()> {
    let env = create_test_env().await?;
    env.tree.create_root(&Scope::unscoped()).await?;

    let err = env.tree.create_root(&Scope::unscoped()).await.unwrap_err();
    assert!(matches!(err, PageTreeError::RootConflict { .. }));
    Ok(())
}

#[tokio::test]
async fn test_rejected_root_leaves_tree_unchanged() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "child page").await?;
    env.child_named(&child, "grandchild").await?;

    let before = env.bounds_under(&root).await?;

    let err = env.tree.create_root(&Scope::unscoped()).await.unwrap_err();
    assert!(matches!(err, PageTreeError::RootConflict { .. }));

    assert_eq!(env.bounds_under(&root).await?, before);
    assert_eq!(env.tree.descendants_and_self(&root.id).await?.len(), 3);
    env.tree.verify_scope(&Scope::unscoped()).await?;
    Ok(())
}

#[tokio::test]
async fn test_children_are_appended_last() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    let first = env.child_named(&root, "first").await?;
    let second = env.child_named(&root, "second").await?;

    let root = env.reload(&root).await?;
    let first = env.reload(&first).await?;
    assert_eq!((root.left, root.right), (1, 6));
    assert_eq!((first.left, first.right, first.depth), (2, 3, 1));
    assert_eq!((second.left, second.right, second.depth), (4, 5, 1));
    Ok(())
}

#[tokio::test]
async fn test_create_child_of_missing_parent() -> Result<()> {
    let env = create_test_env().await?;

    let err = env
        .tree
        .create_child("missing", &Scope::unscoped())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_explicit_slug_is_slugified_and_name_kept() -> Result<()> {
    let env = create_test_env().await?;
    let page = env.tree.create_root(&Scope::unscoped()).await?;

    env.slugs
        .create_slug(&page.id, NewSlug::new(LANG, "root page").with_slug("different slug"))
        .await?;

    assert_eq!(env.lookup.get_name(&page.id, LANG).await?, "root page");
    assert_eq!(env.url(&page).await?, "/different-slug");
    Ok(())
}

#[tokio::test]
async fn test_url_of_root_with_and_without_lang_prefix() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    assert_eq!(env.lookup.get_url(&root.id, LANG, false).await?, "/root-page");
    assert_eq!(env.lookup.get_url(&root.id, LANG, true).await?, "/en/root-page");
    Ok(())
}

#[tokio::test]
async fn test_url_of_child_page() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "child page").await?;

    assert_eq!(env.lookup.get_url(&child.id, LANG, false).await?, "/root-page/child-page");
    assert_eq!(
        env.lookup.get_url(&child.id, LANG, true).await?,
        "/en/root-page/child-page"
    );
    Ok(())
}

#[tokio::test]
async fn test_second_slug_in_same_language_is_rejected() -> Result<()> {
    let env = create_test_env().await?;
    let page = env.root_named(&Scope::unscoped(), "root page").await?;

    let err = env
        .slugs
        .create_slug(&page.id, NewSlug::new(LANG, "root page modified"))
        .await
        .unwrap_err();
    assert!(matches!(err, PageTreeError::SlugAlreadyExists { .. }));
    Ok(())
}

#[tokio::test]
async fn test_url_fails_when_an_ancestor_lacks_the_language() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.tree.create_child(&root.id, &Scope::unscoped()).await?;
    env.slugs
        .create_slug(&child.id, NewSlug::new("it", "pagina figlio"))
        .await?;

    match env.lookup.get_url(&child.id, "it", false).await {
        Err(PageTreeError::MissingSlugForLanguage { page_id, lang_code }) => {
            assert_eq!(page_id, root.id);
            assert_eq!(lang_code, "it");
        }
        other => panic!("expected MissingSlugForLanguage, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_url_fails_when_the_page_lacks_the_language() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.tree.create_child(&root.id, &Scope::unscoped()).await?;
    env.slugs
        .create_slug(&child.id, NewSlug::new("it", "pagina figlio"))
        .await?;

    match env.lookup.get_url(&child.id, LANG, false).await {
        Err(PageTreeError::MissingSlugForLanguage { page_id, .. }) => {
            assert_eq!(page_id, child.id);
        }
        other => panic!("expected MissingSlugForLanguage, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_child_may_reuse_the_root_slug() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "root page").await?;

    assert_eq!(env.url(&child).await?, "/root-page/root-page");
    Ok(())
}

#[tokio::test]
async fn test_equal_slugs_in_different_languages() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    env.slugs
        .create_slug(&root.id, NewSlug::new("it", "root page"))
        .await?;

    assert_eq!(env.lookup.get_url(&root.id, LANG, false).await?, "/root-page");
    assert_eq!(env.lookup.get_url(&root.id, "it", false).await?, "/root-page");
    assert_eq!(env.lookup.get_url(&root.id, LANG, true).await?, "/en/root-page");
    assert_eq!(env.lookup.get_url(&root.id, "it", true).await?, "/it/root-page");
    Ok(())
}

#[tokio::test]
async fn test_incremental_counter_for_colliding_siblings() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    let first = env.child_named(&root, "root page").await?;
    let second = env.child_named(&root, "root page").await?;
    let third = env.child_named(&root, "root page").await?;

    assert_eq!(env.url(&first).await?, "/root-page/root-page");
    assert_eq!(env.url(&second).await?, "/root-page/root-page-1");
    assert_eq!(env.url(&third).await?, "/root-page/root-page-2");
    Ok(())
}

#[tokio::test]
async fn test_collisions_are_per_language() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    let first = env.child_named(&root, "child page").await?;
    let second = env.tree.create_child(&root.id, &Scope::unscoped()).await?;
    env.slugs
        .create_slug(&second.id, NewSlug::new("it", "child page"))
        .await?;

    assert_eq!(env.lookup.get_slug(&first.id, LANG).await?, "child-page");
    assert_eq!(env.lookup.get_slug(&second.id, "it").await?, "child-page");
    Ok(())
}

#[tokio::test]
async fn test_custom_suffix_function() -> Result<()> {
    let config = PageTreeConfig::default()
        .with_suffix_policy(SuffixPolicy::custom(|_slug, _separator, _taken| "random".to_string()));
    let env = create_test_env_with(config).await?;

    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "child page").await?;
    let child2 = env.child_named(&root, "child page").await?;

    assert_eq!(env.url(&child).await?, "/root-page/child-page");
    assert_eq!(env.url(&child2).await?, "/root-page/child-page-random");
    Ok(())
}

#[tokio::test]
async fn test_custom_separator() -> Result<()> {
    let env = create_test_env_with(PageTreeConfig::default().with_separator("_")).await?;

    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "child page").await?;
    let child2 = env.child_named(&root, "child page").await?;

    assert_eq!(env.url(&child).await?, "/root_page/child_page");
    assert_eq!(env.url(&child2).await?, "/root_page/child_page_1");
    Ok(())
}

#[tokio::test]
async fn test_name_of_missing_language() -> Result<()> {
    let env = create_test_env().await?;
    let page = env.root_named(&Scope::unscoped(), "generic page").await?;

    assert_eq!(env.lookup.get_name(&page.id, LANG).await?, "generic page");

    let err = env.lookup.get_name(&page.id, "it").await.unwrap_err();
    assert!(matches!(err, PageTreeError::SlugNotFound { .. }));
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_custom_slugifier() -> Result<()> {
    let mut env = create_test_env().await?;
    env.slugs = env
        .slugs
        .clone()
        .with_slugifier(|text: &str, sep: &str| text.to_uppercase().replace(' ', sep));

    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    assert_eq!(env.url(&root).await?, "/ROOT-PAGE");
    Ok(())
}
