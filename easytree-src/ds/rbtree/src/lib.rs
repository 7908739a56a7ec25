//! Ordered associative containers backed by an anchored red-black
//! tree. One balancing core serves both the map and the set façades;
//! the key-extraction policy decides how a stored value yields its
//! key.

use std::{cmp::Ordering, marker::PhantomData, ptr::NonNull};

mod node;

pub mod map;
pub mod set;

#[cfg(test)]
mod debug;

pub use map::RbTreeMap;
pub use set::RbTreeSet;

use node::{Color, Link, Node, NodeBase, Side};

/// How a stored value exposes the key it is ordered by.
pub trait ExtractKey<V> {
    type Key;
    fn extract(value: &V) -> &Self::Key;
}

/// The value is its own key. Used by sets.
pub enum UseSelf {}

impl<T> ExtractKey<T> for UseSelf {
    type Key = T;
    fn extract(value: &T) -> &T { value }
}

/// The key is the first element of a pair. Used by maps.
pub enum UseFirst {}

impl<K, V> ExtractKey<(K, V)> for UseFirst {
    type Key = K;
    fn extract(value: &(K, V)) -> &K { &value.0 }
}

/// Strict weak ordering between keys.
pub trait Compare<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Less;

impl<K: Ord + ?Sized> Compare<K> for Less {
    fn less(&self, a: &K, b: &K) -> bool { a < b }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Greater;

impl<K: Ord + ?Sized> Compare<K> for Greater {
    fn less(&self, a: &K, b: &K) -> bool { b < a }
}

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Compare<K> for F {
    fn less(&self, a: &K, b: &K) -> bool { self(a, b) }
}

/// Position token into a tree. `end()` is a valid position one past
/// the maximum element. A cursor is invalidated by the removal of the
/// element it points at and by `clear`, nothing else.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cursor {
    pub(crate) node: NonNull<NodeBase>,
}

/// Intrusive red-black tree ordered by `C` over the keys that policy
/// `P` extracts from `V`.
///
/// The anchor node is allocated separately from the element nodes:
/// its parent link is the root, its left link caches the minimum and
/// its right link the maximum. Both extremes point back at the anchor
/// while the tree is empty, which makes `begin() == end()` fall out
/// of the representation.
pub struct RbTree<V, P, C = Less> {
    anchor: NonNull<NodeBase>,
    len: usize,
    compare: C,
    _marker: PhantomData<(V, P)>,
}

impl<V, P, C> RbTree<V, P, C> {
    fn new_anchor() -> NonNull<NodeBase> {
        let anchor = NonNull::from(Box::leak(Box::new(NodeBase {
            right: None,
            left: None,
            parent: None,
            color: Color::Red,
        })));
        unsafe {
            (*anchor.as_ptr()).left = Some(anchor);
            (*anchor.as_ptr()).right = Some(anchor);
        }
        anchor
    }

    pub fn with_compare(compare: C) -> Self {
        Self {
            anchor: Self::new_anchor(),
            len: 0,
            compare,
            _marker: PhantomData,
        }
    }

    pub fn new() -> Self
    where
        C: Default,
    {
        Self::with_compare(C::default())
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn key_comp(&self) -> &C { &self.compare }

    pub fn clear(&mut self) {
        unsafe {
            if let Some(root) = (*self.anchor.as_ptr()).parent {
                Self::nuke_subtree(root);
            }
            (*self.anchor.as_ptr()).parent = None;
            (*self.anchor.as_ptr()).left = Some(self.anchor);
            (*self.anchor.as_ptr()).right = Some(self.anchor);
        }
        self.len = 0;
    }

    // Frees a whole subtree without any rebalancing. Recurses down
    // the right spines and iterates down the left ones, so the
    // recursion depth stays within the tree height.
    unsafe fn nuke_subtree(node: NonNull<NodeBase>) {
        unsafe {
            let mut node = Some(node);
            while let Some(n) = node {
                if let Some(right) = (*n.as_ptr()).right {
                    Self::nuke_subtree(right);
                }
                let left = (*n.as_ptr()).left;
                drop(Box::from_raw(n.as_ptr() as *mut Node<V>));
                node = left;
            }
        }
    }

    pub fn begin(&self) -> Cursor {
        Cursor { node: unsafe { (*self.anchor.as_ptr()).left.unwrap() } }
    }

    pub fn end(&self) -> Cursor { Cursor { node: self.anchor } }

    pub fn next(&self, pos: Cursor) -> Cursor {
        debug_assert!(pos.node != self.anchor);
        Cursor { node: unsafe { node::increment(pos.node) } }
    }

    pub fn prev(&self, pos: Cursor) -> Cursor {
        Cursor { node: unsafe { node::decrement(pos.node) } }
    }

    pub fn get(&self, pos: Cursor) -> Option<&V> {
        (pos.node != self.anchor)
            .then(|| unsafe { &(*pos.node.cast::<Node<V>>().as_ptr()).value })
    }

    pub(crate) fn get_mut(&mut self, pos: Cursor) -> Option<&mut V> {
        (pos.node != self.anchor).then(|| unsafe {
            &mut (*pos.node.cast::<Node<V>>().as_ptr()).value
        })
    }

    /// Unlinks the element at `pos` and hands its value back, along
    /// with the position that followed it.
    pub fn remove(&mut self, pos: Cursor) -> (Cursor, V) {
        debug_assert!(pos.node != self.anchor);
        let next = unsafe { node::increment(pos.node) };
        unsafe { node::tree_erase(pos.node, self.anchor) };
        self.len -= 1;
        let boxed =
            unsafe { Box::from_raw(pos.node.as_ptr() as *mut Node<V>) };
        let Node { value, .. } = *boxed;
        (Cursor { node: next }, value)
    }

    pub fn erase(&mut self, pos: Cursor) -> Cursor { self.remove(pos).0 }

    /// Erases `[first, last)`. Erasing everything degrades to `clear`,
    /// which frees the nodes without rebalancing between removals.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        if first == self.begin() && last == self.end() {
            self.clear();
            self.end()
        } else {
            let mut pos = first;
            while pos != last {
                pos = self.erase(pos);
            }
            last
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter { raw: self.raw_iter(), _marker: PhantomData }
    }

    pub(crate) fn raw_iter(&self) -> RawIter {
        RawIter { front: self.begin().node, back: self.anchor, len: self.len }
    }

    unsafe fn clone_node(node: NonNull<NodeBase>) -> NonNull<NodeBase>
    where
        V: Clone,
    {
        unsafe {
            let src = node.cast::<Node<V>>();
            let new = NonNull::from(Box::leak(Box::new(Node {
                base: NodeBase {
                    right: None,
                    left: None,
                    parent: None,
                    color: (*node.as_ptr()).color,
                },
                value: (*src.as_ptr()).value.clone(),
            })));
            new.cast::<NodeBase>()
        }
    }

    // Structural copy preserving shape and colors, so the clone needs
    // no rebalancing. Right subtrees recurse, left spines iterate.
    unsafe fn copy_subtree(
        source: NonNull<NodeBase>,
        dest_parent: NonNull<NodeBase>,
    ) -> NonNull<NodeBase>
    where
        V: Clone,
    {
        unsafe {
            let dest = Self::clone_node(source);
            (*dest.as_ptr()).parent = Some(dest_parent);

            if let Some(right) = (*source.as_ptr()).right {
                (*dest.as_ptr()).right = Some(Self::copy_subtree(right, dest));
            }

            let mut dest_parent = dest;
            let mut source = (*source.as_ptr()).left;
            while let Some(src) = source {
                let new = Self::clone_node(src);
                (*dest_parent.as_ptr()).left = Some(new);
                (*new.as_ptr()).parent = Some(dest_parent);

                if let Some(right) = (*src.as_ptr()).right {
                    (*new.as_ptr()).right =
                        Some(Self::copy_subtree(right, new));
                }

                dest_parent = new;
                source = (*src.as_ptr()).left;
            }

            dest
        }
    }
}

impl<V, P: ExtractKey<V>, C: Compare<P::Key>> RbTree<V, P, C> {
    unsafe fn key<'a>(node: NonNull<NodeBase>) -> &'a P::Key
    where
        V: 'a,
    {
        unsafe { P::extract(&(*node.cast::<Node<V>>().as_ptr()).value) }
    }

    /// Exact-match lookup in a single descent: remember the lowest
    /// node not less than the key on the way down, then verify it.
    pub fn find(&self, key: &P::Key) -> Cursor {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut range_end = self.anchor;
            while let Some(node) = current {
                current = if !self.compare.less(Self::key(node), key) {
                    range_end = node;
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }
            if range_end != self.anchor
                && !self.compare.less(key, Self::key(range_end))
            {
                Cursor { node: range_end }
            } else {
                self.end()
            }
        }
    }

    /// Heterogeneous lookup. `compare` must order `Q` probes the same
    /// way the tree's comparator orders the stored keys.
    pub fn find_as<Q: ?Sized, F>(&self, key: &Q, mut compare: F) -> Cursor
    where
        F: FnMut(&P::Key, &Q) -> Ordering,
    {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut range_end = self.anchor;
            while let Some(node) = current {
                current = if compare(Self::key(node), key) != Ordering::Less {
                    range_end = node;
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }
            if range_end != self.anchor
                && compare(Self::key(range_end), key) == Ordering::Equal
            {
                Cursor { node: range_end }
            } else {
                self.end()
            }
        }
    }

    /// First position whose key is not less than `key`.
    pub fn lower_bound(&self, key: &P::Key) -> Cursor {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut range_end = self.anchor;
            while let Some(node) = current {
                current = if !self.compare.less(Self::key(node), key) {
                    range_end = node;
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }
            Cursor { node: range_end }
        }
    }

    /// First position whose key is greater than `key`.
    pub fn upper_bound(&self, key: &P::Key) -> Cursor {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut range_end = self.anchor;
            while let Some(node) = current {
                current = if self.compare.less(key, Self::key(node)) {
                    range_end = node;
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }
            Cursor { node: range_end }
        }
    }

    // Returns the attachment point for a unique-keys insertion. On
    // success the node is the future parent; on failure it is the
    // element already holding the key.
    fn insert_position_unique(
        &self,
        key: &P::Key,
    ) -> (NonNull<NodeBase>, bool) {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut lower_bound = self.anchor;
            // An empty descent behaves like ending on a left child,
            // which inserts at the front.
            let mut less_than_node = true;

            while let Some(node) = current {
                less_than_node = self.compare.less(key, Self::key(node));
                lower_bound = node;
                current = if less_than_node {
                    debug_assert!(!self.compare.less(Self::key(node), key));
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }

            // `lower_bound` currently names the upper bound; stepping
            // back once turns it into the last node not greater than
            // the key, the only candidate for an equal key.
            let parent = lower_bound;

            if less_than_node {
                if Some(lower_bound) != (*self.anchor.as_ptr()).left {
                    lower_bound = node::decrement(lower_bound);
                } else {
                    return (lower_bound, true);
                }
            }

            if self.compare.less(Self::key(lower_bound), key) {
                debug_assert!(!self.compare.less(key, Self::key(lower_bound)));
                (parent, true)
            } else {
                (lower_bound, false)
            }
        }
    }

    // Equal keys descend right, so repeated insertions of the same
    // key keep their insertion order.
    fn insert_position_multi(&self, key: &P::Key) -> NonNull<NodeBase> {
        unsafe {
            let mut current = (*self.anchor.as_ptr()).parent;
            let mut range_end = self.anchor;
            while let Some(node) = current {
                range_end = node;
                current = if self.compare.less(key, Self::key(node)) {
                    debug_assert!(!self.compare.less(Self::key(node), key));
                    (*node.as_ptr()).left
                } else {
                    (*node.as_ptr()).right
                };
            }
            range_end
        }
    }

    // `force_left` pins an equal key to the left of `parent`, which
    // hinted insertion uses to honor the position the caller chose.
    fn insert_at(
        &mut self,
        parent: NonNull<NodeBase>,
        force_left: bool,
        value: V,
    ) -> Cursor {
        let side = if force_left
            || parent == self.anchor
            || self.compare.less(P::extract(&value), unsafe {
                Self::key(parent)
            }) {
            Side::Left
        } else {
            Side::Right
        };

        let node = NonNull::from(Box::leak(Box::new(Node {
            base: NodeBase {
                right: None,
                left: None,
                parent: None,
                color: Color::Red,
            },
            value,
        })))
        .cast::<NodeBase>();

        unsafe { node::tree_insert(node, parent, self.anchor, side) };
        self.len += 1;
        Cursor { node }
    }

    /// Inserts `value` if no element with an equal key exists.
    /// Otherwise hands the value back together with the position of
    /// the existing element.
    pub fn insert_unique(&mut self, value: V) -> Result<Cursor, (Cursor, V)> {
        let (pos, can_insert) =
            self.insert_position_unique(P::extract(&value));
        if can_insert {
            Ok(self.insert_at(pos, false, value))
        } else {
            Err((Cursor { node: pos }, value))
        }
    }

    /// Inserts `value` unconditionally; equal keys land after the
    /// elements already present.
    pub fn insert_multi(&mut self, value: V) -> Cursor {
        let pos = self.insert_position_multi(P::extract(&value));
        self.insert_at(pos, false, value)
    }

    // A useful hint names the element just before the insertion
    // point. Returns the parent to attach under, or `None` when the
    // hint does not help and a full descent is needed.
    fn hint_position_unique(
        &self,
        hint: Cursor,
        key: &P::Key,
    ) -> Option<(NonNull<NodeBase>, bool)> {
        unsafe {
            let node = hint.node;
            if Some(node) != (*self.anchor.as_ptr()).right
                && node != self.anchor
            {
                let next = node::increment(node);

                if self.compare.less(Self::key(node), key) {
                    debug_assert!(!self.compare.less(key, Self::key(node)));
                    if self.compare.less(key, Self::key(next)) {
                        debug_assert!(
                            !self.compare.less(Self::key(next), key)
                        );
                        return if (*node.as_ptr()).right.is_some() {
                            Some((next, true))
                        } else {
                            Some((node, false))
                        };
                    }
                }
                return None;
            }

            // Hint at the back: appending after the maximum is the
            // common fast path for presorted input.
            if self.len > 0 {
                let last = (*self.anchor.as_ptr()).right.unwrap();
                if self.compare.less(Self::key(last), key) {
                    debug_assert!(!self.compare.less(key, Self::key(last)));
                    return Some((last, false));
                }
            }
            None
        }
    }

    fn hint_position_multi(
        &self,
        hint: Cursor,
        key: &P::Key,
    ) -> Option<(NonNull<NodeBase>, bool)> {
        unsafe {
            let node = hint.node;
            if Some(node) != (*self.anchor.as_ptr()).right
                && node != self.anchor
            {
                let next = node::increment(node);

                if !self.compare.less(key, Self::key(node))
                    && !self.compare.less(Self::key(next), key)
                {
                    return if (*node.as_ptr()).right.is_some() {
                        Some((next, true))
                    } else {
                        Some((node, false))
                    };
                }
                return None;
            }

            if self.len > 0 {
                let last = (*self.anchor.as_ptr()).right.unwrap();
                if !self.compare.less(key, Self::key(last)) {
                    return Some((last, false));
                }
            }
            None
        }
    }

    /// Like [`insert_unique`](Self::insert_unique), but tries the
    /// hinted position first; a correct hint makes the insertion
    /// amortized constant time. A duplicate key leaves the tree
    /// untouched and yields the existing position.
    pub fn insert_hint_unique(&mut self, hint: Cursor, value: V) -> Cursor {
        match self.hint_position_unique(hint, P::extract(&value)) {
            Some((parent, force_left)) => {
                self.insert_at(parent, force_left, value)
            }
            None => match self.insert_unique(value) {
                Ok(pos) | Err((pos, _)) => pos,
            },
        }
    }

    pub fn insert_hint_multi(&mut self, hint: Cursor, value: V) -> Cursor {
        match self.hint_position_multi(hint, P::extract(&value)) {
            Some((parent, force_left)) => {
                self.insert_at(parent, force_left, value)
            }
            None => self.insert_multi(value),
        }
    }
}

impl<V, P, C> Drop for RbTree<V, P, C> {
    fn drop(&mut self) {
        self.clear();
        unsafe { drop(Box::from_raw(self.anchor.as_ptr())) };
    }
}

impl<V: Clone, P, C: Clone> Clone for RbTree<V, P, C> {
    fn clone(&self) -> Self {
        let mut new = Self::with_compare(self.compare.clone());
        unsafe {
            if let Some(root) = (*self.anchor.as_ptr()).parent {
                let new_root = Self::copy_subtree(root, new.anchor);
                (*new.anchor.as_ptr()).parent = Some(new_root);
                (*new.anchor.as_ptr()).left =
                    Some(node::min_node(new_root));
                (*new.anchor.as_ptr()).right =
                    Some(node::max_node(new_root));
            }
        }
        new.len = self.len;
        new
    }
}

impl<V, P, C: Default> Default for RbTree<V, P, C> {
    fn default() -> Self { Self::with_compare(C::default()) }
}

impl<V, P, C> FromIterator<V> for RbTree<V, P, C>
where
    P: ExtractKey<V>,
    C: Compare<P::Key> + Default,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<V, P, C> Extend<V> for RbTree<V, P, C>
where
    P: ExtractKey<V>,
    C: Compare<P::Key>,
{
    // First one wins on duplicate keys; later values are dropped.
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert_unique(value);
        }
    }
}

#[derive(Clone)]
pub(crate) struct RawIter {
    front: NonNull<NodeBase>,
    back: NonNull<NodeBase>,
    len: usize,
}

impl RawIter {
    pub(crate) unsafe fn next(&mut self) -> Link {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = self.front;
        self.front = unsafe { node::increment(node) };
        Some(node)
    }

    pub(crate) unsafe fn next_back(&mut self) -> Link {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        self.back = unsafe { node::decrement(self.back) };
        Some(self.back)
    }

    pub(crate) fn len(&self) -> usize { self.len }
}

pub struct Iter<'a, V> {
    raw: RawIter,
    _marker: PhantomData<&'a V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<&'a V> {
        unsafe {
            self.raw.next().map(|n| &(*n.cast::<Node<V>>().as_ptr()).value)
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len, Some(self.raw.len))
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        unsafe {
            self.raw
                .next_back()
                .map(|n| &(*n.cast::<Node<V>>().as_ptr()).value)
        }
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone(), _marker: PhantomData }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use crate::{debug::assert_invariants, Greater, RbTree, UseFirst, UseSelf};

    type SetTree<K> = RbTree<K, UseSelf>;
    type MapTree<K, V> = RbTree<(K, V), UseFirst>;

    #[test]
    fn random_insert_erase() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut tree = MapTree::<u32, u32>::new();
        let mut expected = BTreeMap::new();

        for i in 0..2000_u32 {
            let key = rng.gen_range(0..256);
            if rng.gen_bool(0.5) {
                match tree.insert_unique((key, i)) {
                    Ok(_) => assert_eq!(expected.insert(key, i), None),
                    Err((pos, _)) => {
                        assert!(expected.contains_key(&key));
                        assert_eq!(tree.get(pos).map(|kv| kv.0), Some(key));
                    }
                }
            } else {
                let pos = tree.find(&key);
                if pos == tree.end() {
                    assert_eq!(expected.remove(&key), None);
                } else {
                    let (_, (k, _)) = tree.remove(pos);
                    assert_eq!(k, key);
                    assert!(expected.remove(&key).is_some());
                }
            }

            assert_invariants(&tree);
            assert_eq!(tree.len(), expected.len());
            assert!(tree
                .iter()
                .map(|&(k, v)| (k, v))
                .eq(expected.iter().map(|(&k, &v)| (k, v))));
        }
    }

    #[test]
    fn random_multi_insert_erase() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut tree = MapTree::<u32, u32>::new();
        // Per key, the values in insertion order.
        let mut expected: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

        for i in 0..2000_u32 {
            let key = rng.gen_range(0..64);
            if rng.gen_bool(0.6) {
                if rng.gen_bool(0.5) {
                    tree.insert_multi((key, i));
                } else {
                    // The element just before the insertion point is
                    // the useful hint; anything else falls back.
                    let upper = tree.upper_bound(&key);
                    let hint = if upper == tree.begin() {
                        tree.end()
                    } else {
                        tree.prev(upper)
                    };
                    tree.insert_hint_multi(hint, (key, i));
                }
                expected.entry(key).or_default().push(i);
            } else {
                let pos = tree.find(&key);
                if pos == tree.end() {
                    assert!(!expected.contains_key(&key));
                } else {
                    // `find` lands on the leftmost equal element, the
                    // oldest of its key.
                    let (_, (k, v)) = tree.remove(pos);
                    assert_eq!(k, key);
                    let values = expected.get_mut(&key).unwrap();
                    assert_eq!(values.remove(0), v);
                    if values.is_empty() {
                        expected.remove(&key);
                    }
                }
            }

            assert_invariants(&tree);
            assert_eq!(tree.len(), expected.values().map(Vec::len).sum());
            assert!(tree.iter().map(|&(k, v)| (k, v)).eq(expected
                .iter()
                .flat_map(|(&k, vs)| vs.iter().map(move |&v| (k, v)))));
        }
    }

    #[test]
    fn bounds() {
        let tree: SetTree<i32> = [1, 3, 5, 7].into_iter().collect();
        let keys = [1, 3, 5, 7];
        for probe in 0..=8 {
            let lower = tree.get(tree.lower_bound(&probe)).copied();
            assert_eq!(lower, keys.iter().copied().find(|&x| x >= probe));
            let upper = tree.get(tree.upper_bound(&probe)).copied();
            assert_eq!(upper, keys.iter().copied().find(|&x| x > probe));
            let found = tree.get(tree.find(&probe)).copied();
            assert_eq!(found, keys.contains(&probe).then_some(probe));
        }
    }

    #[test]
    fn multi_equal_keys_keep_insertion_order() {
        let mut tree = MapTree::<i32, usize>::new();
        for (i, key) in [5, 3, 5, 1, 5, 3].into_iter().enumerate() {
            tree.insert_multi((key, i));
            assert_invariants(&tree);
        }
        let actual: Vec<_> = tree.iter().copied().collect();
        assert_eq!(actual, [(1, 3), (3, 1), (3, 5), (5, 0), (5, 2), (5, 4)]);
    }

    #[test]
    fn hinted_ascending_run() {
        let mut tree = SetTree::<u32>::new();
        let mut hint = tree.end();
        for key in 0..500 {
            hint = tree.insert_hint_unique(hint, key);
        }
        assert_invariants(&tree);
        assert_eq!(tree.len(), 500);
        assert!(tree.iter().copied().eq(0..500));
    }

    #[test]
    fn useless_hint_falls_back() {
        let mut tree = SetTree::<u32>::new();
        for key in [10, 20, 30] {
            tree.insert_unique(key).unwrap();
        }
        let begin = tree.begin();
        tree.insert_hint_unique(begin, 25);
        assert_invariants(&tree);
        assert!(tree.iter().copied().eq([10, 20, 25, 30]));

        // A duplicate under a hint changes nothing.
        let pos = tree.insert_hint_unique(tree.begin(), 20);
        assert_eq!(tree.get(pos), Some(&20));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn hinted_multi_pins_position() {
        let mut tree = MapTree::<i32, usize>::new();
        let a = tree.insert_multi((1, 0));
        tree.insert_multi((1, 1));
        // Hinting right after the first equal element splices the new
        // one between the two.
        tree.insert_hint_multi(a, (1, 2));
        assert_invariants(&tree);
        let actual: Vec<_> = tree.iter().copied().collect();
        assert_eq!(actual, [(1, 0), (1, 2), (1, 1)]);
    }

    #[test]
    fn clone_is_independent() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut tree = SetTree::<u32>::new();
        for _ in 0..300 {
            let _ = tree.insert_unique(rng.gen_range(0..1000));
        }
        let copy = tree.clone();
        assert_invariants(&copy);
        assert_eq!(copy.len(), tree.len());
        assert!(copy.iter().eq(tree.iter()));

        let pos = tree.begin();
        tree.erase(pos);
        assert_eq!(copy.len(), tree.len() + 1);
        assert_invariants(&tree);
        assert_invariants(&copy);
    }

    #[test]
    fn find_as_str_probe() {
        let tree: SetTree<String> = ["apple", "banana", "cherry"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pos =
            tree.find_as("banana", |k: &String, q: &str| k.as_str().cmp(q));
        assert_eq!(tree.get(pos).map(|s| s.as_str()), Some("banana"));
        let pos =
            tree.find_as("durian", |k: &String, q: &str| k.as_str().cmp(q));
        assert_eq!(pos, tree.end());
    }

    #[test]
    fn erase_range_partial_and_full() {
        let mut tree: SetTree<i32> = (0..10).collect();
        let first = tree.find(&3);
        let last = tree.find(&7);
        tree.erase_range(first, last);
        assert_invariants(&tree);
        assert!(tree.iter().copied().eq([0, 1, 2, 7, 8, 9]));

        let (first, last) = (tree.begin(), tree.end());
        tree.erase_range(first, last);
        assert!(tree.is_empty());
        assert_invariants(&tree);
    }

    #[test]
    fn reverse_ordering() {
        let mut tree = RbTree::<i32, UseSelf, Greater>::new();
        for key in [3, 1, 4, 1, 5, 9, 2, 6] {
            let _ = tree.insert_unique(key);
        }
        assert_invariants(&tree);
        assert!(tree.iter().copied().eq([9, 6, 5, 4, 3, 2, 1]));
    }

    #[test]
    fn cursor_navigation() {
        let tree: SetTree<i32> = [2, 4, 6].into_iter().collect();
        let end = tree.end();
        let last = tree.prev(end);
        assert_eq!(tree.get(last), Some(&6));
        let mid = tree.prev(last);
        assert_eq!(tree.get(mid), Some(&4));
        assert_eq!(tree.next(mid), last);
        assert_eq!(tree.next(last), end);
        assert_eq!(tree.get(end), None);
    }

    #[test]
    fn double_ended_iter() {
        let tree: SetTree<i32> = (0..10).collect();
        assert!(tree.iter().rev().copied().eq((0..10).rev()));

        let mut it = tree.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&9));
        assert_eq!(it.len(), 8);
        assert!(it.copied().eq(1..9));
    }
}
