use std::ptr::NonNull;

use crate::{
    node::{self, black_count, Color, NodeBase},
    Compare, ExtractKey, RbTree,
};

/// Checks the full structural contract: anchor wiring, cached
/// extremes, parent-child link symmetry, no red node with a red
/// parent, equal black counts on every root-to-leaf path, sorted
/// order, and the length counter.
pub(crate) fn assert_invariants<V, P, C>(tree: &RbTree<V, P, C>)
where
    P: ExtractKey<V>,
    C: Compare<P::Key>,
{
    unsafe {
        let anchor = tree.anchor;
        assert_eq!((*anchor.as_ptr()).color, Color::Red);

        let root = match (*anchor.as_ptr()).parent {
            Some(root) => root,
            None => {
                assert_eq!(tree.len(), 0);
                assert_eq!((*anchor.as_ptr()).left, Some(anchor));
                assert_eq!((*anchor.as_ptr()).right, Some(anchor));
                return;
            }
        };

        assert_eq!((*root.as_ptr()).color, Color::Black);
        assert_eq!((*root.as_ptr()).parent, Some(anchor));
        assert_eq!((*anchor.as_ptr()).left, Some(node::min_node(root)));
        assert_eq!((*anchor.as_ptr()).right, Some(node::max_node(root)));

        let leftmost = (*anchor.as_ptr()).left.unwrap();
        let expected_black = black_count(root, leftmost);

        let mut count = 0;
        let mut prev: Option<NonNull<NodeBase>> = None;
        let mut node = leftmost;
        while node != anchor {
            let left = (*node.as_ptr()).left;
            let right = (*node.as_ptr()).right;

            if let Some(left) = left {
                assert_eq!((*left.as_ptr()).parent, Some(node));
            }
            if let Some(right) = right {
                assert_eq!((*right.as_ptr()).parent, Some(node));
            }

            if (*node.as_ptr()).color == Color::Red {
                let parent = (*node.as_ptr()).parent.unwrap();
                assert_eq!((*parent.as_ptr()).color, Color::Black);
            }

            // Paths to absent children must all cross the same number
            // of black nodes.
            if left.is_none() || right.is_none() {
                assert_eq!(black_count(root, node), expected_black);
            }

            if let Some(prev) = prev {
                let prev_key = RbTree::<V, P, C>::key(prev);
                let key = RbTree::<V, P, C>::key(node);
                assert!(!tree.compare.less(key, prev_key));
            }

            count += 1;
            prev = Some(node);
            node = node::increment(node);
        }

        assert_eq!(count, tree.len());
    }
}
