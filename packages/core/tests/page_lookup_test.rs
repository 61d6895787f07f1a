//! Integration tests for URL resolution
//!
//! Tests cover:
//! - lookup and match_url on roots, children and deep pages
//! - Per-language resolution
//! - Not-found paths (unknown segments, trailing slash, missing language)
//! - Round trips between get_url, lookup and match_url

mod common;

use anyhow::Result;
use common::{create_test_env, LANG};
use pagetree_core::models::{NewSlug, Scope};
use pagetree_core::services::PageTreeError;

#[tokio::test]
async fn test_find_root_by_url() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    let found = env.lookup.lookup("/root-page", LANG, &Scope::unscoped()).await?;
    assert_eq!(found.id, root.id);

    let matched = env.lookup.match_url("/root-page", LANG, &Scope::unscoped()).await?;
    assert_eq!(matched.id, root.id);
    Ok(())
}

#[tokio::test]
async fn test_find_child_by_url() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    env.child_named(&root, "first child").await?;
    let child = env.child_named(&root, "child page").await?;

    let found = env
        .lookup
        .lookup("/root-page/child-page", LANG, &Scope::unscoped())
        .await?;
    assert_eq!(found.id, child.id);

    // leading slash is optional
    let matched = env
        .lookup
        .match_url("root-page/child-page", LANG, &Scope::unscoped())
        .await?;
    assert_eq!(matched.id, child.id);
    Ok(())
}

#[tokio::test]
async fn test_find_by_url_in_other_language() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let child = env.child_named(&root, "child page").await?;
    env.slugs
        .create_slug(&root.id, NewSlug::new("it", "pagina radice"))
        .await?;
    env.slugs
        .create_slug(&child.id, NewSlug::new("it", "pagina figlio"))
        .await?;

    let found = env
        .lookup
        .lookup("/pagina-radice/pagina-figlio", "it", &Scope::unscoped())
        .await?;
    assert_eq!(found.id, child.id);

    // slugs of one language never resolve in another
    let err = env
        .lookup
        .lookup("/pagina-radice/pagina-figlio", LANG, &Scope::unscoped())
        .await
        .unwrap_err();
    assert!(matches!(err, PageTreeError::UrlNotFound { .. }));

    let err = env
        .lookup
        .match_url("/root-page/pagina-figlio", "it", &Scope::unscoped())
        .await
        .unwrap_err();
    assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_deep_page_with_repeated_slugs() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    let news = env.child_named(&root, "news").await?;
    let archive = env.child_named(&root, "archive").await?;
    let archived_news = env.child_named(&archive, "news").await?;
    let deep = env.child_named(&archived_news, "news").await?;

    for path in ["/root-page/news", "/root-page/archive/news", "/root-page/archive/news/news"] {
        let a = env.lookup.lookup(path, LANG, &Scope::unscoped()).await?;
        let b = env.lookup.match_url(path, LANG, &Scope::unscoped()).await?;
        assert_eq!(a.id, b.id, "resolvers disagree on {}", path);
    }

    let found = env
        .lookup
        .lookup("/root-page/news", LANG, &Scope::unscoped())
        .await?;
    assert_eq!(found.id, news.id);
    let found = env
        .lookup
        .match_url("/root-page/archive/news/news", LANG, &Scope::unscoped())
        .await?;
    assert_eq!(found.id, deep.id);

    // a path whose last slug exists at the right depth but under another parent
    let err = env
        .lookup
        .match_url("/root-page/news/news", LANG, &Scope::unscoped())
        .await
        .unwrap_err();
    assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unknown_path_is_not_found() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    env.child_named(&root, "child page").await?;

    for path in ["/nothing", "/root-page/nothing", "/root-page/child-page/deeper", "/child-page"] {
        let err = env.lookup.lookup(path, LANG, &Scope::unscoped()).await.unwrap_err();
        assert!(err.is_not_found(), "lookup of {} should fail", path);
        let err = env.lookup.match_url(path, LANG, &Scope::unscoped()).await.unwrap_err();
        assert!(err.is_not_found(), "match_url of {} should fail", path);
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_path_is_the_root() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;

    for path in ["", "/"] {
        assert_eq!(env.lookup.lookup(path, LANG, &Scope::unscoped()).await?.id, root.id);
        assert_eq!(env.lookup.match_url(path, LANG, &Scope::unscoped()).await?.id, root.id);
    }
    Ok(())
}

#[tokio::test]
async fn test_trailing_slash_is_not_found() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "root page").await?;
    env.child_named(&root, "child page").await?;

    for path in ["/root-page/", "/root-page/child-page/", "/root-page//child-page"] {
        let err = env.lookup.lookup(path, LANG, &Scope::unscoped()).await.unwrap_err();
        assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
        let err = env.lookup.match_url(path, LANG, &Scope::unscoped()).await.unwrap_err();
        assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_tree_is_not_found() -> Result<()> {
    let env = create_test_env().await?;

    let err = env.lookup.lookup("/", LANG, &Scope::unscoped()).await.unwrap_err();
    assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
    let err = env.lookup.match_url("/home", LANG, &Scope::unscoped()).await.unwrap_err();
    assert!(matches!(err, PageTreeError::UrlNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_get_url_round_trips() -> Result<()> {
    let env = create_test_env().await?;
    let root = env.root_named(&Scope::unscoped(), "Home").await?;
    let about = env.child_named(&root, "About us").await?;
    let team = env.child_named(&about, "Team").await?;
    env.child_named(&about, "Team").await?;
    let jobs = env.child_named(&root, "Jobs @ Acme").await?;

    for page in [&root, &about, &team, &jobs] {
        let url = env.url(page).await?;
        let found = env.lookup.lookup(&url, LANG, &Scope::unscoped()).await?;
        let matched = env.lookup.match_url(&url, LANG, &Scope::unscoped()).await?;
        assert_eq!(found.id, page.id, "lookup of {}", url);
        assert_eq!(matched.id, page.id, "match_url of {}", url);
    }

    assert_eq!(env.url(&jobs).await?, "/home/jobs-at-acme");
    Ok(())
}
