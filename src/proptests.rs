use crate::{ColoringStrategy, LongTreeSet, KEY_MAX, KEY_MIN};

use crate::arena::{Color, NodeArena, NodeId, Side};
use crate::tree::{Children, DeleteCase, DeleteFixup};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashSet};

/// Checks parent links, key order, red-red edges and black heights below `id`.
/// Returns the subtree's black height, counting the sentinel.
fn audit(
    nodes: &NodeArena,
    id: NodeId,
    lo: Option<i64>,
    hi: Option<i64>,
    count: &mut usize,
) -> usize {
    if id.is_nil() {
        return 1;
    }
    *count += 1;
    let key = nodes.key(id);
    if let Some(lo) = lo {
        assert!(key > lo, "key {key} not above {lo}");
    }
    if let Some(hi) = hi {
        assert!(key < hi, "key {key} not below {hi}");
    }

    let left = nodes.left(id);
    let right = nodes.right(id);
    for child in [left, right] {
        if !child.is_nil() {
            assert_eq!(nodes.parent(child), id, "broken parent link under {key}");
            if nodes.is_red(id) {
                assert_eq!(nodes.color(child), Color::Black, "red-red under {key}");
            }
        }
    }

    let lh = audit(nodes, left, lo, Some(key), count);
    let rh = audit(nodes, right, Some(key), hi, count);
    assert_eq!(lh, rh, "black height differs under {key}");
    lh + usize::from(nodes.is_black(id))
}

fn validate_tree(s: &LongTreeSet) {
    let t = &s.tree;
    let nodes = &t.nodes;

    assert_eq!(nodes.color(NodeId::NIL), Color::Black, "sentinel must be black");
    if !t.root.is_nil() {
        assert!(nodes.is_root(t.root), "root must hang from the sentinel");
        assert!(nodes.is_black(t.root), "root must be black");
    }

    let mut count = 0usize;
    audit(nodes, t.root, None, None, &mut count);
    assert_eq!(count, t.len, "reachable node count must match len");
    assert_eq!(
        nodes.allocated(),
        t.len + nodes.tombstones(),
        "every handed-out slot is live or a tombstone"
    );

    if t.len == 0 {
        assert_eq!((s.lower_bound(), s.upper_bound()), (KEY_MAX, KEY_MIN));
    } else {
        assert_eq!(s.lower_bound(), nodes.key(t.first()));
        assert_eq!(s.upper_bound(), nodes.key(t.last()));
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Add(#[proptest(strategy = "-300i64..300")] i64),
    #[proptest(weight = 30)]
    Remove(#[proptest(strategy = "-300i64..300")] i64),
    #[proptest(weight = 15)]
    Contains(#[proptest(strategy = "-300i64..300")] i64),
    #[proptest(weight = 4)]
    TailFrom(#[proptest(strategy = "-310i64..310")] i64),
    #[proptest(weight = 1)]
    Compact,
}

fn apply(s: &mut LongTreeSet, m: &mut BTreeSet<i64>, op: Op) -> std::result::Result<(), TestCaseError> {
    match op {
        Op::Add(k) => prop_assert_eq!(s.add(k), m.insert(k), "add({})", k),
        Op::Remove(k) => prop_assert_eq!(s.remove(k), m.remove(&k), "remove({})", k),
        Op::Contains(k) => prop_assert_eq!(s.contains(k), m.contains(&k), "contains({})", k),
        Op::TailFrom(k) => {
            let got: Vec<i64> = s.iter_from(k).collect();
            let expected: Vec<i64> = m.range(k..).copied().collect();
            prop_assert_eq!(got, expected, "iter_from({})", k);
        }
        Op::Compact => s.compactify(),
    }
    prop_assert_eq!(s.len(), m.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        let mut s = LongTreeSet::new();
        let mut m = BTreeSet::new();
        for op in ops {
            apply(&mut s, &mut m, op)?;
        }
        validate_tree(&s);
        prop_assert_eq!(s.to_vec(), m.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn prop_bulk_load_then_mutate(
        keys in prop::collection::btree_set(any::<i64>(), 0..600),
        strategy in any::<ColoringStrategy>(),
        ops in prop::collection::vec(any::<Op>(), 0..=300),
    ) {
        let sorted: Vec<i64> = keys.iter().copied().collect();
        let mut s = LongTreeSet::from_sorted_unique_with(&sorted, strategy).unwrap();
        validate_tree(&s);
        prop_assert_eq!(s.to_vec(), sorted.clone());

        let mut m = keys;
        for op in ops {
            apply(&mut s, &mut m, op)?;
        }
        validate_tree(&s);
        prop_assert_eq!(s.to_vec(), m.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn prop_compaction_is_transparent(
        adds in prop::collection::vec(-1000i64..1000, 0..500),
        removes in prop::collection::vec(-1000i64..1000, 0..500),
    ) {
        let mut s = LongTreeSet::new();
        s.add_all(adds.iter().copied());
        s.remove_all(removes.iter().copied());
        let before = s.to_vec();
        let hash = s.content_hash();
        let copy = s.clone();

        s.compactify();
        validate_tree(&s);
        prop_assert_eq!(s.tombstones(), 0);
        prop_assert_eq!(s.to_vec(), before);
        prop_assert_eq!(s.content_hash(), hash);
        prop_assert_eq!(&s, &copy);
        for k in -1000i64..1000 {
            prop_assert_eq!(s.contains(k), copy.contains(k));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<i64> = vec![-5, 0, 3, 8, 13, 21, 34];

    for_each_permutation(&keys, |perm| {
        let mut s = LongTreeSet::new();
        for k in perm {
            assert!(s.add(k));
            validate_tree(&s);
        }
        assert_eq!(s.to_vec(), keys);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<i64> = vec![-5, 0, 3, 8, 13, 21, 34];

    let mut bases = vec![keys.iter().copied().collect::<LongTreeSet>()];
    for strategy in [
        ColoringStrategy::Balanced,
        ColoringStrategy::ToAdd,
        ColoringStrategy::ToRemove,
    ] {
        bases.push(LongTreeSet::from_sorted_unique_with(&keys, strategy).unwrap());
    }

    for base in &bases {
        for_each_permutation(&keys, |perm| {
            let mut s = base.clone();
            let mut m: BTreeSet<i64> = keys.iter().copied().collect();
            for k in perm {
                assert!(s.remove(k));
                assert!(!s.remove(k));
                m.remove(&k);
                assert_eq!(s.to_vec(), m.iter().copied().collect::<Vec<_>>());
                validate_tree(&s);
            }
            assert!(s.is_empty());
            assert!(s.tree.root.is_nil());
        });
    }
}

/// Every reachable combination of (children, spliced color, side, first fix-up
/// case) must show up in a long random workload. A red spliced node never needs
/// fix-up, so red only pairs with `None`; root removals have no side.
#[test]
fn delete_case_coverage() {
    let mut seen: HashSet<DeleteCase> = HashSet::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..8u32 {
        let range = 16i64 << round;
        let mut s = LongTreeSet::new();
        for _ in 0..20_000 {
            let k = rng.gen_range(0..range);
            if rng.gen_bool(0.5) {
                s.add(k);
            } else if let Some(case) = s.remove_traced(k) {
                seen.insert(case);
            }
        }
        validate_tree(&s);
    }

    let fixups = [
        None,
        Some(DeleteFixup::SiblingRed),
        Some(DeleteFixup::SiblingBlackBothBlack),
        Some(DeleteFixup::SiblingBlackNearRed),
        Some(DeleteFixup::SiblingBlackFarRed),
    ];
    let mut expected = Vec::new();
    for children in [Children::Two, Children::AtMostOne] {
        for side in [Side::Left, Side::Right] {
            expected.push(DeleteCase {
                children,
                color: Color::Red,
                side: Some(side),
                fixup: None,
            });
            for fixup in fixups {
                expected.push(DeleteCase {
                    children,
                    color: Color::Black,
                    side: Some(side),
                    fixup,
                });
            }
        }
    }

    for case in &expected {
        assert!(seen.contains(case), "deletion case never exercised: {case:?}");
    }
    for case in &seen {
        if case.color == Color::Red {
            assert_eq!(case.fixup, None, "red splice ran fix-up: {case:?}");
        }
    }
}

#[test]
fn ascending_and_descending_bulk_churn() {
    let mut s = LongTreeSet::with_capacity(1).unwrap();
    for k in 0..5_000 {
        s.add(k);
    }
    validate_tree(&s);
    for k in (0..5_000).rev().step_by(2) {
        s.remove(k);
    }
    validate_tree(&s);
    s.compactify();
    validate_tree(&s);
    assert_eq!(s.to_vec(), (0..5_000).step_by(2).collect::<Vec<_>>());
}
