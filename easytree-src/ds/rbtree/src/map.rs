use std::{cmp::Ordering, fmt, marker::PhantomData, mem, ops::Index};

use crate::{
    node::Node, Compare, Cursor, Less, RawIter, RbTree, UseFirst,
};

/// Ordered map with stable cursors. Entries are `(K, V)` pairs kept
/// sorted by `C` over the keys; at most one entry per key.
pub struct RbTreeMap<K, V, C = Less> {
    tree: RbTree<(K, V), UseFirst, C>,
}

impl<K, V, C> RbTreeMap<K, V, C> {
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn clear(&mut self) { self.tree.clear() }

    pub fn begin(&self) -> Cursor { self.tree.begin() }
    pub fn end(&self) -> Cursor { self.tree.end() }
    pub fn next(&self, pos: Cursor) -> Cursor { self.tree.next(pos) }
    pub fn prev(&self, pos: Cursor) -> Cursor { self.tree.prev(pos) }

    /// The entry at `pos`, or `None` at the end position.
    pub fn key_value(&self, pos: Cursor) -> Option<(&K, &V)> {
        self.tree.get(pos).map(|kv| (&kv.0, &kv.1))
    }

    pub fn value_mut(&mut self, pos: Cursor) -> Option<&mut V> {
        self.tree.get_mut(pos).map(|kv| &mut kv.1)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { raw: self.tree.raw_iter(), _marker: PhantomData }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut { raw: self.tree.raw_iter(), _marker: PhantomData }
    }
}

impl<K, V, C: Compare<K>> RbTreeMap<K, V, C> {
    pub fn new() -> Self
    where
        C: Default,
    {
        Self { tree: RbTree::new() }
    }

    pub fn with_compare(compare: C) -> Self {
        Self { tree: RbTree::with_compare(compare) }
    }

    /// Inserts `key → value`. If the key is already present, the
    /// value is replaced in place and the old one handed back; the
    /// existing entry and any cursors at it stay valid.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.insert_unique((key, value)) {
            Ok(_) => None,
            Err((pos, (_, value))) => {
                let slot = self.tree.get_mut(pos).unwrap();
                Some(mem::replace(&mut slot.1, value))
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(self.tree.find(key)).map(|kv| &kv.1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.tree.find(key);
        self.tree.get_mut(pos).map(|kv| &mut kv.1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.find(key) != self.tree.end()
    }

    pub fn count(&self, key: &K) -> usize {
        self.contains_key(key) as usize
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.tree.find(key);
        if pos == self.tree.end() {
            return None;
        }
        let (_, (_, value)) = self.tree.remove(pos);
        Some(value)
    }

    /// Removes the entry at `pos`, yielding the following position.
    pub fn erase(&mut self, pos: Cursor) -> Cursor { self.tree.erase(pos) }

    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        self.tree.erase_range(first, last)
    }

    /// The value under `key`, inserting `V::default()` first when the
    /// key is absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let pos = self.tree.lower_bound(&key);
        let missing = match self.tree.get(pos) {
            Some((k, _)) => self.tree.key_comp().less(&key, k),
            None => true,
        };
        let pos = if missing {
            self.tree.insert_hint_unique(pos, (key, V::default()))
        } else {
            pos
        };
        &mut self.tree.get_mut(pos).unwrap().1
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

    /// Half-open range of entries with keys equal to `key`. With
    /// unique keys this is the lower bound widened by at most one
    /// element.
    pub fn equal_range(&self, key: &K) -> (Cursor, Cursor) {
        let lower = self.tree.lower_bound(key);
        match self.tree.get(lower) {
            Some((k, _)) if !self.tree.key_comp().less(key, k) => {
                (lower, self.tree.next(lower))
            }
            _ => (lower, lower),
        }
    }
}

impl<K, V, C> Default for RbTreeMap<K, V, C>
where
    C: Compare<K> + Default,
{
    fn default() -> Self { Self::new() }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RbTreeMap<K, V, C> {
    fn clone(&self) -> Self { Self { tree: self.tree.clone() } }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> FromIterator<(K, V)> for RbTreeMap<K, V, C>
where
    C: Compare<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for RbTreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RbTreeMap<K, V, C> {}

impl<K, V, C: Compare<K>> Index<&K> for RbTreeMap<K, V, C> {
    type Output = V;
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

pub struct Iter<'a, K, V> {
    raw: RawIter,
    _marker: PhantomData<&'a (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            self.raw.next().map(|n| {
                let pair = &(*n.cast::<Node<(K, V)>>().as_ptr()).value;
                (&pair.0, &pair.1)
            })
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        unsafe {
            self.raw.next_back().map(|n| {
                let pair = &(*n.cast::<Node<(K, V)>>().as_ptr()).value;
                (&pair.0, &pair.1)
            })
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone(), _marker: PhantomData }
    }
}

pub struct IterMut<'a, K, V> {
    raw: RawIter,
    _marker: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    // Keys stay shared; mutating one would break the ordering.
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            self.raw.next().map(|n| {
                let pair = &mut (*n.cast::<Node<(K, V)>>().as_ptr()).value;
                (&pair.0, &mut pair.1)
            })
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        unsafe {
            self.raw.next_back().map(|n| {
                let pair = &mut (*n.cast::<Node<(K, V)>>().as_ptr()).value;
                (&pair.0, &mut pair.1)
            })
        }
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

#[test]
fn map_basic_lifecycle() {
    let mut map = RbTreeMap::<i32, i32>::new();
    assert_eq!(map.insert(1, 2), None);
    assert_eq!(map.insert(3, 4), None);
    assert_eq!(map.insert(5, 6), None);
    assert_eq!(map.len(), 3);

    assert_eq!(map.remove(&3), Some(4));
    assert_eq!(map.remove(&3), None);
    assert_eq!(map.len(), 2);

    // Inserting over an existing key updates in place.
    assert_eq!(map.insert(5, 11), Some(6));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&5), Some(&11));

    assert_eq!(map.find(&7), map.end());
    assert!(!map.contains_key(&7));

    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.begin(), map.end());
}

#[test]
fn map_cursors() {
    let map: RbTreeMap<i32, &str> =
        [(2, "b"), (1, "a"), (3, "c")].into_iter().collect();

    let pos = map.find(&2);
    assert_eq!(map.key_value(pos), Some((&2, &"b")));
    assert_eq!(map.key_value(map.next(pos)), Some((&3, &"c")));
    assert_eq!(map.key_value(map.prev(pos)), Some((&1, &"a")));
    assert_eq!(map.next(map.find(&3)), map.end());
    assert_eq!(map.key_value(map.end()), None);
}

#[test]
fn map_get_or_default() {
    let mut counts = RbTreeMap::<char, u32>::new();
    for c in "abracadabra".chars() {
        *counts.get_or_default(c) += 1;
    }
    let actual: Vec<_> =
        counts.iter().map(|(&c, &n)| (c, n)).collect();
    assert_eq!(actual, [('a', 5), ('b', 2), ('c', 1), ('d', 1), ('r', 2)]);
}

#[test]
fn map_equal_range_and_count() {
    let map: RbTreeMap<i32, i32> =
        [(1, 10), (3, 30), (5, 50)].into_iter().collect();

    let (first, last) = map.equal_range(&3);
    assert_eq!(map.key_value(first), Some((&3, &30)));
    assert_eq!(map.next(first), last);
    assert_eq!(map.count(&3), 1);

    let (first, last) = map.equal_range(&4);
    assert_eq!(first, last);
    assert_eq!(first, map.find(&5));
    assert_eq!(map.count(&4), 0);
}

#[test]
fn map_index() {
    let map: RbTreeMap<i32, &str> =
        [(1, "one"), (2, "two")].into_iter().collect();
    assert_eq!(map[&1], "one");
    assert_eq!(map[&2], "two");
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn map_index_missing() {
    let map = RbTreeMap::<i32, i32>::new();
    let _ = map[&1];
}

#[test]
fn map_iter_mut() {
    let mut map: RbTreeMap<i32, i32> =
        (0..5).map(|k| (k, k * 10)).collect();
    for (&k, v) in map.iter_mut() {
        *v += k;
    }
    assert!(map.iter().map(|(&k, &v)| (k, v)).eq((0..5).map(|k| (k, k * 11))));
}

#[test]
fn map_extend_updates() {
    let mut map: RbTreeMap<i32, i32> = [(1, 1), (2, 2)].into_iter().collect();
    map.extend([(2, 20), (3, 30)]);
    assert!(map.iter().map(|(&k, &v)| (k, v)).eq([(1, 1), (2, 20), (3, 30)]));
}

#[test]
fn map_debug_fmt() {
    let map: RbTreeMap<i32, &str> =
        [(2, "two"), (1, "one")].into_iter().collect();
    assert_eq!(format!("{map:?}"), r#"{1: "one", 2: "two"}"#);
}

#[test]
fn map_rev_iter() {
    let map: RbTreeMap<i32, i32> = (0..6).map(|k| (k, -k)).collect();
    assert!(map
        .iter()
        .rev()
        .map(|(&k, &v)| (k, v))
        .eq((0..6).rev().map(|k| (k, -k))));
}

#[test]
fn map_eq_and_clone() {
    let map: RbTreeMap<i32, i32> = (0..8).map(|k| (k, k * k)).collect();
    let copy = map.clone();
    assert_eq!(map, copy);

    let mut other = copy;
    other.insert(3, -1);
    assert_ne!(map, other);
}
