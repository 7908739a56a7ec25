use std::{cmp::Ordering, fmt};

use crate::{Compare, Cursor, Less, RbTree, UseSelf};

/// Ordered set with stable cursors. Elements are their own keys; at
/// most one element per key under the ordering `C`.
pub struct RbTreeSet<K, C = Less> {
    tree: RbTree<K, UseSelf, C>,
}

impl<K, C> RbTreeSet<K, C> {
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn clear(&mut self) { self.tree.clear() }

    pub fn begin(&self) -> Cursor { self.tree.begin() }
    pub fn end(&self) -> Cursor { self.tree.end() }
    pub fn next(&self, pos: Cursor) -> Cursor { self.tree.next(pos) }
    pub fn prev(&self, pos: Cursor) -> Cursor { self.tree.prev(pos) }

    /// The element at `pos`, or `None` at the end position.
    pub fn value(&self, pos: Cursor) -> Option<&K> { self.tree.get(pos) }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter { inner: self.tree.iter() }
    }
}

impl<K, C: Compare<K>> RbTreeSet<K, C> {
    pub fn new() -> Self
    where
        C: Default,
    {
        Self { tree: RbTree::new() }
    }

    pub fn with_compare(compare: C) -> Self {
        Self { tree: RbTree::with_compare(compare) }
    }

    /// Inserts `key`, reporting whether it was absent. A duplicate
    /// leaves the set untouched.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert_unique(key).is_ok()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tree.find(key) != self.tree.end()
    }

    pub fn get(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.find(key))
    }

    pub fn count(&self, key: &K) -> usize {
        self.contains(key) as usize
    }

    pub fn remove(&mut self, key: &K) -> bool {
        let pos = self.tree.find(key);
        if pos == self.tree.end() {
            return false;
        }
        self.tree.erase(pos);
        true
    }

    /// Removes the element at `pos`, yielding the following position.
    pub fn erase(&mut self, pos: Cursor) -> Cursor { self.tree.erase(pos) }

    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        self.tree.erase_range(first, last)
    }

    pub fn find(&self, key: &K) -> Cursor { self.tree.find(key) }

    pub fn find_as<Q: ?Sized, F>(&self, key: &Q, compare: F) -> Cursor
    where
        F: FnMut(&K, &Q) -> Ordering,
    {
        self.tree.find_as(key, compare)
    }

    pub fn lower_bound(&self, key: &K) -> Cursor {
        self.tree.lower_bound(key)
    }

    pub fn upper_bound(&self, key: &K) -> Cursor {
        self.tree.upper_bound(key)
    }

    pub fn equal_range(&self, key: &K) -> (Cursor, Cursor) {
        let lower = self.tree.lower_bound(key);
        match self.tree.get(lower) {
            Some(k) if !self.tree.key_comp().less(key, k) => {
                (lower, self.tree.next(lower))
            }
            _ => (lower, lower),
        }
    }
}

impl<K, C: Compare<K> + Default> Default for RbTreeSet<K, C> {
    fn default() -> Self { Self::new() }
}

impl<K: Clone, C: Clone> Clone for RbTreeSet<K, C> {
    fn clone(&self) -> Self { Self { tree: self.tree.clone() } }
}

impl<K: fmt::Debug, C> fmt::Debug for RbTreeSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for RbTreeSet<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K, C: Compare<K>> Extend<K> for RbTreeSet<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: PartialEq, C> PartialEq for RbTreeSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C> Eq for RbTreeSet<K, C> {}

impl<'a, K, C> IntoIterator for &'a RbTreeSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;
    fn into_iter(self) -> Iter<'a, K> { self.iter() }
}

pub struct Iter<'a, K> {
    inner: crate::Iter<'a, K>,
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;
    fn next(&mut self) -> Option<&'a K> { self.inner.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.inner.size_hint() }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<&'a K> { self.inner.next_back() }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[test]
fn set_duplicate_insert() {
    let mut set = RbTreeSet::<String>::new();
    assert!(set.insert("xx".to_owned()));
    assert!(set.insert("aa".to_owned()));
    assert!(set.insert("bb".to_owned()));
    assert!(!set.insert("aa".to_owned()));
    assert_eq!(set.len(), 3);
    assert!(set.iter().map(|s| s.as_str()).eq(["aa", "bb", "xx"]));

    assert!(set.remove(&"bb".to_owned()));
    assert!(!set.remove(&"bb".to_owned()));
    assert!(set.contains(&"aa".to_owned()));
    assert!(!set.contains(&"bb".to_owned()));

    set.clear();
    assert!(set.is_empty());
    assert!(set.insert("dd".to_owned()));
    assert_eq!(set.len(), 1);
}

#[test]
fn set_closure_comparator() {
    let mut set = RbTreeSet::with_compare(|a: &i32, b: &i32| b < a);
    for key in [3, 1, 4, 1, 5] {
        set.insert(key);
    }
    assert!(set.iter().copied().eq([5, 4, 3, 1]));
    assert!(set.contains(&4));
    assert!(!set.contains(&2));
}

#[test]
fn set_bounds_and_equal_range() {
    let set: RbTreeSet<i32> = [10, 20, 30].into_iter().collect();
    assert_eq!(set.value(set.lower_bound(&15)), Some(&20));
    assert_eq!(set.value(set.upper_bound(&20)), Some(&30));
    assert_eq!(set.upper_bound(&30), set.end());

    let (first, last) = set.equal_range(&20);
    assert_eq!(set.value(first), Some(&20));
    assert_eq!(set.next(first), last);
    assert_eq!(set.count(&20), 1);

    let (first, last) = set.equal_range(&25);
    assert_eq!(first, last);
    assert_eq!(set.count(&25), 0);
}

#[test]
fn set_find_as() {
    let set: RbTreeSet<Vec<u8>> =
        [b"ab".to_vec(), b"cd".to_vec()].into_iter().collect();
    let pos = set.find_as(b"cd".as_slice(), |k, q| k.as_slice().cmp(q));
    assert_eq!(set.value(pos).map(|v| v.as_slice()), Some(b"cd".as_slice()));
    let pos = set.find_as(b"ef".as_slice(), |k, q| k.as_slice().cmp(q));
    assert_eq!(pos, set.end());
}

#[test]
fn set_debug_fmt() {
    let set: RbTreeSet<i32> = [3, 1, 2].into_iter().collect();
    assert_eq!(format!("{set:?}"), "{1, 2, 3}");
}

#[test]
fn set_erase_walk() {
    let mut set: RbTreeSet<i32> = (0..10).collect();
    // Erase the even elements with a cursor walk.
    let mut pos = set.begin();
    while pos != set.end() {
        if set.value(pos).unwrap() % 2 == 0 {
            pos = set.erase(pos);
        } else {
            pos = set.next(pos);
        }
    }
    assert!(set.iter().copied().eq([1, 3, 5, 7, 9]));
}
