use crate::node::letter_bit;
use crate::trie::Trie;

use proptest::prelude::*;
use std::collections::BTreeSet;

fn validate_masks(t: &Trie) {
    let mut stack = vec![t.root()];
    let mut sentinels = 0usize;
    while let Some(id) = stack.pop() {
        let node = t.node(id).expect("reachable node must be live");
        if node.is_terminal() {
            assert!(node.children().is_empty(), "sentinel must be a leaf");
            assert_eq!(node.mask(), 0, "sentinel mask must be empty");
            sentinels += 1;
        }

        let mut expected = letter_bit(node.character());
        for (&c, &child) in node.children() {
            let child_node = t.node(child).expect("child must be live");
            assert_eq!(child_node.parent(), Some(id), "parent link mismatch");
            assert_eq!(child_node.character(), c, "child stored under wrong key");
            expected |= letter_bit(c) | child_node.mask();
            stack.push(child);
        }
        assert_eq!(node.mask(), expected, "mask must equal union of subtree");
    }
    assert_eq!(sentinels, t.len(), "one sentinel per stored key");
}

fn is_subsequence(pattern: &str, key: &str) -> bool {
    let mut chars = key.chars();
    pattern.chars().all(|p| chars.any(|c| c == p))
}

fn word() -> impl Strategy<Value = String> {
    // A small alphabet keeps shared prefixes and repeated letters common.
    "[a-f]{0,7}"
}

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Remove(String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => word().prop_map(Op::Add),
        2 => word().prop_map(Op::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fuzzy_search_matches_subsequence_model(
        words in prop::collection::vec(word(), 0..40),
        pattern in "[a-f]{0,4}",
    ) {
        let mut trie = Trie::new();
        trie.add_all(&words).unwrap();

        let expected: Vec<String> = words
            .iter()
            .filter(|w| is_subsequence(&pattern, w))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(trie.fuzzy_search(&pattern).unwrap(), expected);
    }

    #[test]
    fn prefix_search_matches_model(
        words in prop::collection::vec(word(), 0..40),
        prefix in "[a-f]{0,3}",
    ) {
        let mut trie = Trie::new();
        trie.add_all(&words).unwrap();

        let expected: BTreeSet<String> = words
            .iter()
            .filter(|w| w.starts_with(&prefix))
            .cloned()
            .collect();
        let found = trie.prefix_search(&prefix).unwrap();
        prop_assert_eq!(found.len(), expected.len(), "prefix search must not repeat keys");
        prop_assert_eq!(found.into_iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn random_ops_match_btreeset(ops in prop::collection::vec(op(), 0..80)) {
        let mut trie = Trie::new();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Add(w) => {
                    prop_assert_eq!(trie.add(&w).unwrap(), w.len());
                    model.insert(w);
                }
                Op::Remove(w) => {
                    let removed = trie.remove(&w).is_ok();
                    prop_assert_eq!(removed, model.remove(&w));
                }
            }
            validate_masks(&trie);
            prop_assert_eq!(trie.len(), model.len());
        }

        let keys: BTreeSet<String> = trie.keys().into_iter().collect();
        prop_assert_eq!(keys, model.clone());
        for w in &model {
            prop_assert!(trie.contains(w));
        }
    }

    #[test]
    fn removing_everything_frees_every_node(words in prop::collection::vec(word(), 0..30)) {
        let mut trie = Trie::new();
        trie.add_all(&words).unwrap();

        let distinct: BTreeSet<_> = words.into_iter().collect();
        for w in &distinct {
            trie.remove(w).unwrap();
        }
        prop_assert!(trie.is_empty());
        prop_assert_eq!(trie.node_count(), 1);
        prop_assert_eq!(trie.mask(), 0);
    }
}
