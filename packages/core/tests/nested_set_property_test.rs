//! Property-based tests for the nested-set arithmetic and URL resolution.
//!
//! Random sequences of inserts, moves and removals must always leave a valid
//! nested set, and a rejected operation must leave it untouched.

mod common;

use proptest::prelude::*;

use pagetree_core::models::{NewSlug, Scope};
use pagetree_core::tree::{MovePosition, NestedSet};

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize },
    Move { node: usize, target: usize, position: MovePosition },
    Remove { node: usize },
}

fn position() -> impl Strategy<Value = MovePosition> {
    prop_oneof![
        Just(MovePosition::Left),
        Just(MovePosition::Right),
        Just(MovePosition::FirstChild),
        Just(MovePosition::LastChild),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<usize>().prop_map(|parent| Op::Insert { parent }),
        4 => (any::<usize>(), any::<usize>(), position())
            .prop_map(|(node, target, position)| Op::Move { node, target, position }),
        1 => any::<usize>().prop_map(|node| Op::Remove { node }),
    ]
}

fn id_at(set: &NestedSet, index: usize) -> String {
    set.entries()[index % set.len()].id.clone()
}

fn subtree_ids(set: &NestedSet, id: &str) -> Vec<String> {
    let top = set.get(id).map(|e| e.bounds).unwrap_or_else(|| panic!("{} in set", id));
    let mut ids: Vec<String> = set
        .entries()
        .iter()
        .filter(|e| top.contains_or_equals(&e.bounds))
        .map(|e| e.id.clone())
        .collect();
    ids.sort();
    ids
}

proptest! {
    /// Every operation keeps the set valid; rejected ones change nothing.
    #[test]
    fn random_operations_keep_nested_set_valid(ops in prop::collection::vec(op(), 1..60)) {
        let mut set = NestedSet::new(Scope::unscoped(), Vec::new());
        set.insert_root("n0").unwrap();
        let mut next_id = 1;

        for op in ops {
            let before = set.entries().to_vec();
            match op {
                Op::Insert { parent } => {
                    let parent = id_at(&set, parent);
                    let (entry, _) = set.insert_last_child(&parent, format!("n{}", next_id)).unwrap();
                    next_id += 1;
                    prop_assert_eq!(entry.parent_id.as_deref(), Some(parent.as_str()));
                }
                Op::Move { node, target, position } => {
                    let node = id_at(&set, node);
                    let target = id_at(&set, target);
                    let subtree = subtree_ids(&set, &node);
                    let target_parent = set.get(&target).and_then(|e| e.parent_id.clone());

                    match set.move_to(&node, &target, position) {
                        Ok(_) => {
                            prop_assert_eq!(subtree_ids(&set, &node), subtree);
                            let parent = set.get(&node).and_then(|e| e.parent_id.clone());
                            match position {
                                MovePosition::FirstChild | MovePosition::LastChild => {
                                    prop_assert_eq!(parent, Some(target.clone()));
                                }
                                MovePosition::Left | MovePosition::Right => {
                                    prop_assert_eq!(parent, target_parent);
                                }
                            }
                        }
                        Err(_) => {
                            prop_assert_eq!(set.entries(), &before[..]);
                        }
                    }
                }
                Op::Remove { node } => {
                    let node = id_at(&set, node);
                    if set.len() > 1 && set.root().map(|r| r.id.as_str()) != Some(node.as_str()) {
                        let removal = set.remove_subtree(&node).unwrap();
                        prop_assert_eq!(removal.removed.len() + set.len(), before.len());
                        prop_assert!(set.get(&node).is_none());
                    }
                }
            }

            prop_assert!(set.verify().is_ok(), "invalid set after {:?}", set.entries());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Both resolvers agree with get_url on every page of a generated tree.
    #[test]
    fn lookup_and_match_url_agree(
        parents in prop::collection::vec(any::<usize>(), 1..15),
        names in prop::collection::vec(prop::sample::select(vec!["home", "news", "about", "team"]), 15),
    ) {
        let result: anyhow::Result<()> = tokio_test::block_on(async {
            let env = common::create_test_env().await?;
            let root = env.root_named(&Scope::unscoped(), "root").await?;
            let mut pages = vec![root];

            for (i, parent) in parents.iter().enumerate() {
                let parent = pages[parent % pages.len()].clone();
                let page = env.tree.create_child(&parent.id, &parent.scope).await?;
                env.slugs
                    .create_slug(&page.id, NewSlug::new(common::LANG, names[i]))
                    .await?;
                pages.push(page);
            }

            for page in &pages {
                let url = env.url(page).await?;
                let found = env.lookup.lookup(&url, common::LANG, &Scope::unscoped()).await?;
                let matched = env.lookup.match_url(&url, common::LANG, &Scope::unscoped()).await?;
                anyhow::ensure!(found.id == page.id, "lookup of {} found {}", url, found.id);
                anyhow::ensure!(matched.id == page.id, "match_url of {} found {}", url, matched.id);
            }
            env.tree.verify_scope(&Scope::unscoped()).await?;
            Ok(())
        });
        prop_assert!(result.is_ok(), "{:?}", result.err());
    }
}
