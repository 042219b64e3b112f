use crate::common::{Direction, NodeId};
use crate::splay::SplayArena;
use log::trace;

/// An ordered set of `i64` that answers inclusive range sums.
///
/// Every operation, including [`SplaySet::contains`], splays the probed region to the root,
/// which is why all of them need `&mut self`.
#[derive(Debug, Default)]
pub struct SplaySet {
    arena: SplayArena,
    root: Option<NodeId>,
    len: usize,
}

impl SplaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Adds `x`. Returns whether it was absent before.
    pub fn insert(&mut self, x: i64) -> bool {
        let (left, right) = self.arena.split(self.root, x);
        if right.is_some_and(|r| self.arena.key(r) == x) {
            self.root = self.arena.merge(left, right);
            return false;
        }
        let node = self.arena.alloc(x);
        let left = self.arena.merge(left, Some(node));
        self.root = self.arena.merge(left, right);
        self.len += 1;
        trace!("inserted {x}, len={}", self.len);
        true
    }

    /// Removes `x`. Returns whether it was present.
    pub fn erase(&mut self, x: i64) -> bool {
        let (found, new_root) = self.arena.find_and_splay(self.root, x);
        self.root = new_root;
        let Some(node) = found else {
            return false;
        };
        debug_assert_eq!(Some(node), self.root);
        let left = self.arena.cut(node, Direction::Left);
        let right = self.arena.cut(node, Direction::Right);
        self.arena.release(node);
        self.root = self.arena.merge(left, right);
        self.len -= 1;
        trace!("erased {x}, len={}", self.len);
        true
    }

    pub fn contains(&mut self, x: i64) -> bool {
        let (found, new_root) = self.arena.find_and_splay(self.root, x);
        self.root = new_root;
        found.is_some()
    }

    /// Sum of all members `k` with `l <= k <= r`.
    pub fn range_sum(&mut self, l: i64, r: i64) -> i128 {
        let (left, mid_right) = self.arena.split(self.root, l);
        let (mid, right) = match r.checked_add(1) {
            Some(upper) => self.arena.split(mid_right, upper),
            // Nothing lies above i64::MAX.
            None => (mid_right, None),
        };
        let answer = self.arena.aggregate(mid);
        let left = self.arena.merge(left, mid);
        self.root = self.arena.merge(left, right);
        answer
    }

    /// Members in ascending order. Does not restructure the tree.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            next: self.root.map(|r| self.arena.first(r)),
            remaining: self.len,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.arena.is_consistent(self.root)
    }
}

#[derive(Debug, Clone)]
pub struct Iter<'a> {
    arena: &'a SplayArena,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let id = self.next?;
        self.next = self.arena.successor(id);
        self.remaining -= 1;
        Some(self.arena.key(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SplaySet {
    type Item = i64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Extend<i64> for SplaySet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl FromIterator<i64> for SplaySet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = SplaySet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_empty() {
        let mut set = SplaySet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains(0));
        assert!(!set.erase(0));
        assert_eq!(set.range_sum(i64::MIN, i64::MAX), 0);
        assert_eq!(set.iter().next(), None);
        assert!(set.is_consistent());
    }

    #[test]
    fn test_contains_empty_any_key() {
        let mut set = SplaySet::new();
        for x in [i64::MIN, -1, 0, 1, 1_000_000_000, i64::MAX] {
            assert!(!set.contains(x));
        }
    }

    #[test]
    fn test_insert_two_sum() {
        let mut set = SplaySet::new();
        set.insert(1);
        set.insert(2);
        assert_eq!(set.range_sum(1, 2), 3);
    }

    #[test]
    fn test_insert_erase_upper_bound() {
        let mut set = SplaySet::new();
        assert!(set.insert(1_000_000_000));
        assert!(set.erase(1_000_000_000));
        assert!(!set.contains(1_000_000_000));
        assert!(set.is_empty());
    }

    #[test]
    fn test_range_sums_135() {
        let mut set: SplaySet = [1, 3, 5].into_iter().collect();
        assert_eq!(set.range_sum(0, 3), 4);
        assert_eq!(set.range_sum(0, 6), 9);
        assert_eq!(set.range_sum(3, 6), 8);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!(set.is_consistent());
    }

    #[test]
    fn test_erase_one_at_a_time() {
        let mut set: SplaySet = [1, 2, 3].into_iter().collect();
        let mut sums = vec![set.range_sum(0, 4)];
        for x in [3, 2, 1] {
            set.erase(x);
            sums.push(set.range_sum(0, 4));
        }
        assert_eq!(sums, vec![6, 3, 1, 0]);
        assert!(set.is_empty());

        let mut set: SplaySet = [1, 2, 3].into_iter().collect();
        let mut sums = Vec::new();
        for x in [1, 2, 3] {
            set.erase(x);
            sums.push(set.range_sum(0, 4));
        }
        assert_eq!(sums, vec![5, 3, 0]);
    }

    #[test]
    fn test_insert_idempotent() {
        let mut set = SplaySet::new();
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert_eq!(set.len(), 1);
        assert_eq!(set.range_sum(7, 7), 7);
        assert!(set.is_consistent());
    }

    #[test]
    fn test_erase_missing() {
        let mut set: SplaySet = [10, 20, 30].into_iter().collect();
        assert!(!set.erase(15));
        assert!(!set.erase(40));
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert!(set.is_consistent());
    }

    #[test]
    fn test_range_sum_inverted_bounds() {
        let mut set: SplaySet = [1, 2, 3].into_iter().collect();
        assert_eq!(set.range_sum(3, 1), 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_range_sum_extreme_keys() {
        let mut set: SplaySet = [i64::MIN, -1, 0, 1, i64::MAX].into_iter().collect();
        assert_eq!(set.range_sum(i64::MIN, i64::MAX), i64::MIN as i128 + i64::MAX as i128);
        assert_eq!(set.range_sum(i64::MAX, i64::MAX), i64::MAX as i128);
        assert_eq!(set.range_sum(i64::MIN, i64::MIN), i64::MIN as i128);
        assert_eq!(set.range_sum(0, i64::MAX), 1 + i64::MAX as i128);
        assert!(set.is_consistent());
    }

    #[test]
    fn test_large_sum_does_not_overflow() {
        let mut set: SplaySet = (0..4).map(|i| i64::MAX - i).collect();
        let expected: i128 = (0..4).map(|i| (i64::MAX - i) as i128).sum();
        assert_eq!(set.range_sum(0, i64::MAX), expected);
    }

    #[test]
    fn test_sorted_insertion_long() {
        let mut set: SplaySet = (0..10_000).collect();
        assert_eq!(set.len(), 10_000);
        assert!(set.is_consistent());
        assert_eq!(set.range_sum(100, 199), (100..200).sum::<i64>() as i128);
        for x in (0..10_000).step_by(2) {
            assert!(set.erase(x));
        }
        assert!(set.is_consistent());
        assert_eq!(set.len(), 5_000);
        assert_eq!(
            set.range_sum(0, 10_000),
            (0..10_000).filter(|x| x % 2 == 1).sum::<i64>() as i128
        );
    }

    #[test]
    fn test_clear() {
        let mut set: SplaySet = [4, 5, 6].into_iter().collect();
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(5));
        set.insert(5);
        assert_eq!(set.range_sum(0, 10), 5);
    }

    #[test]
    fn test_iter_size_hint() {
        let set: SplaySet = [9, 3, 6].into_iter().collect();
        let iter = set.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!((&set).into_iter().collect::<Vec<_>>(), vec![3, 6, 9]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i64),
        Erase(i64),
        Contains(i64),
        Sum(i64, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        let key = -50i64..50;
        prop_oneof![
            key.clone().prop_map(Op::Insert),
            key.clone().prop_map(Op::Erase),
            key.clone().prop_map(Op::Contains),
            (key.clone(), key).prop_map(|(l, r)| Op::Sum(l, r)),
        ]
    }

    proptest! {
        #[test]
        fn test_matches_btreeset(ops in proptest::collection::vec(op(), 0..200)) {
            let mut set = SplaySet::new();
            let mut model = BTreeSet::new();
            for op in ops {
                match op {
                    Op::Insert(x) => {
                        prop_assert_eq!(set.insert(x), model.insert(x));
                    }
                    Op::Erase(x) => {
                        prop_assert_eq!(set.erase(x), model.remove(&x));
                    }
                    Op::Contains(x) => {
                        prop_assert_eq!(set.contains(x), model.contains(&x));
                    }
                    Op::Sum(l, r) => {
                        let expected: i128 = if l <= r {
                            model.range(l..=r).map(|&k| k as i128).sum()
                        } else {
                            0
                        };
                        prop_assert_eq!(set.range_sum(l, r), expected);
                    }
                }
                prop_assert!(set.is_consistent());
                prop_assert_eq!(set.len(), model.len());
            }
            prop_assert_eq!(set.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn test_insert_then_contains(keys in proptest::collection::vec(any::<i64>(), 1..100)) {
            let mut set: SplaySet = keys.iter().copied().collect();
            for &k in &keys {
                prop_assert!(set.contains(k));
            }
            prop_assert!(set.is_consistent());
        }

        #[test]
        fn test_sum_independent_of_history(
            keys in proptest::collection::btree_set(-1000i64..1000, 0..60),
            l in -1000i64..1000,
            r in -1000i64..1000,
        ) {
            let mut ascending: SplaySet = keys.iter().copied().collect();
            let mut descending: SplaySet = keys.iter().rev().copied().collect();
            // Same net key-set reached through extra insert/erase churn.
            let mut churned = SplaySet::new();
            for &k in &keys {
                churned.insert(k);
                churned.insert(k + 2000);
                churned.erase(k + 2000);
            }
            let a = ascending.range_sum(l, r);
            prop_assert_eq!(a, descending.range_sum(l, r));
            prop_assert_eq!(a, churned.range_sum(l, r));
        }
    }
}
