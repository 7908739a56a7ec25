use std::{mem, ptr::NonNull};

pub(crate) type Link = Option<NonNull<NodeBase>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy)]
pub(crate) enum Side {
    Left,
    Right,
}

// `right` is declared first because it is the most frequently touched
// link. The anchor is a bare `NodeBase` with no value attached: its
// `parent` is the tree root, `left` the minimum node and `right` the
// maximum node (both self-referential while the tree is empty). The
// anchor stays red forever and is never rebalanced as a real node.
pub(crate) struct NodeBase {
    pub(crate) right: Link,
    pub(crate) left: Link,
    pub(crate) parent: Link,
    pub(crate) color: Color,
}

// The base must stay the first field so that a `NonNull<NodeBase>`
// handed out for a `Node<V>` can be cast back.
#[repr(C)]
pub(crate) struct Node<V> {
    pub(crate) base: NodeBase,
    pub(crate) value: V,
}

unsafe fn is_red(link: Link) -> bool {
    // An absent child counts as black.
    link.map_or(false, |n| unsafe { (*n.as_ptr()).color } == Color::Red)
}

pub(crate) unsafe fn min_node(node: NonNull<NodeBase>) -> NonNull<NodeBase> {
    unsafe {
        let mut node = node;
        while let Some(left) = (*node.as_ptr()).left {
            node = left;
        }
        node
    }
}

pub(crate) unsafe fn max_node(node: NonNull<NodeBase>) -> NonNull<NodeBase> {
    unsafe {
        let mut node = node;
        while let Some(right) = (*node.as_ptr()).right {
            node = right;
        }
        node
    }
}

/// In-order successor. Walking off the maximum node lands on the
/// anchor, i.e. the end position.
pub(crate) unsafe fn increment(node: NonNull<NodeBase>) -> NonNull<NodeBase> {
    unsafe {
        if let Some(right) = (*node.as_ptr()).right {
            min_node(right)
        } else {
            let mut node = node;
            let mut up = (*node.as_ptr()).parent.unwrap();
            while (*up.as_ptr()).right == Some(node) {
                node = up;
                up = (*up.as_ptr()).parent.unwrap();
            }
            // A one-node climb ending where `node.right` already points
            // at `up` means we stopped on the anchor itself.
            if (*node.as_ptr()).right != Some(up) {
                node = up;
            }
            node
        }
    }
}

/// In-order predecessor. The anchor is recognized by being red with
/// `parent.parent == self`; stepping back from it jumps to the cached
/// maximum node.
pub(crate) unsafe fn decrement(node: NonNull<NodeBase>) -> NonNull<NodeBase> {
    unsafe {
        let parent = (*node.as_ptr()).parent.unwrap();
        if (*parent.as_ptr()).parent == Some(node)
            && (*node.as_ptr()).color == Color::Red
        {
            return (*node.as_ptr()).right.unwrap();
        }
        if let Some(left) = (*node.as_ptr()).left {
            return max_node(left);
        }

        let mut node = node;
        let mut up = parent;
        while (*up.as_ptr()).left == Some(node) {
            node = up;
            up = (*up.as_ptr()).parent.unwrap();
        }
        up
    }
}

unsafe fn rotate_left(
    node: NonNull<NodeBase>,
    root: NonNull<NodeBase>,
) -> NonNull<NodeBase> {
    unsafe {
        let mut root = root;
        let temp = (*node.as_ptr()).right.unwrap();

        (*node.as_ptr()).right = (*temp.as_ptr()).left;
        if let Some(left) = (*temp.as_ptr()).left {
            (*left.as_ptr()).parent = Some(node);
        }
        (*temp.as_ptr()).parent = (*node.as_ptr()).parent;

        if node == root {
            root = temp;
        } else {
            let parent = (*node.as_ptr()).parent.unwrap();
            if (*parent.as_ptr()).left == Some(node) {
                (*parent.as_ptr()).left = Some(temp);
            } else {
                (*parent.as_ptr()).right = Some(temp);
            }
        }

        (*temp.as_ptr()).left = Some(node);
        (*node.as_ptr()).parent = Some(temp);

        root
    }
}

unsafe fn rotate_right(
    node: NonNull<NodeBase>,
    root: NonNull<NodeBase>,
) -> NonNull<NodeBase> {
    unsafe {
        let mut root = root;
        let temp = (*node.as_ptr()).left.unwrap();

        (*node.as_ptr()).left = (*temp.as_ptr()).right;
        if let Some(right) = (*temp.as_ptr()).right {
            (*right.as_ptr()).parent = Some(node);
        }
        (*temp.as_ptr()).parent = (*node.as_ptr()).parent;

        if node == root {
            root = temp;
        } else {
            let parent = (*node.as_ptr()).parent.unwrap();
            if (*parent.as_ptr()).right == Some(node) {
                (*parent.as_ptr()).right = Some(temp);
            } else {
                (*parent.as_ptr()).left = Some(temp);
            }
        }

        (*temp.as_ptr()).right = Some(node);
        (*node.as_ptr()).parent = Some(temp);

        root
    }
}

/// Links `node` below `parent` on the given side, maintains the
/// anchor's cached extremes, then repairs the red-black invariants
/// upward from the new node.
pub(crate) unsafe fn tree_insert(
    node: NonNull<NodeBase>,
    parent: NonNull<NodeBase>,
    anchor: NonNull<NodeBase>,
    side: Side,
) {
    unsafe {
        (*node.as_ptr()).parent = Some(parent);
        (*node.as_ptr()).right = None;
        (*node.as_ptr()).left = None;
        (*node.as_ptr()).color = Color::Red;

        match side {
            Side::Left => {
                // Also refreshes the leftmost cache when `parent` is
                // the anchor (empty tree).
                (*parent.as_ptr()).left = Some(node);

                if parent == anchor {
                    (*anchor.as_ptr()).parent = Some(node);
                    (*anchor.as_ptr()).right = Some(node);
                } else if Some(parent) == (*anchor.as_ptr()).left {
                    (*anchor.as_ptr()).left = Some(node);
                }
            }
            Side::Right => {
                (*parent.as_ptr()).right = Some(node);

                if Some(parent) == (*anchor.as_ptr()).right {
                    (*anchor.as_ptr()).right = Some(node);
                }
            }
        }

        let mut root = (*anchor.as_ptr()).parent.unwrap();
        let mut node = node;

        while node != root && is_red((*node.as_ptr()).parent) {
            let parent = (*node.as_ptr()).parent.unwrap();
            let grandparent = (*parent.as_ptr()).parent.unwrap();

            if (*grandparent.as_ptr()).left == Some(parent) {
                let uncle = (*grandparent.as_ptr()).right;

                if is_red(uncle) {
                    (*parent.as_ptr()).color = Color::Black;
                    (*uncle.unwrap().as_ptr()).color = Color::Black;
                    (*grandparent.as_ptr()).color = Color::Red;
                    node = grandparent;
                } else {
                    if (*parent.as_ptr()).right == Some(node) {
                        node = parent;
                        root = rotate_left(node, root);
                    }

                    let parent = (*node.as_ptr()).parent.unwrap();
                    (*parent.as_ptr()).color = Color::Black;
                    (*grandparent.as_ptr()).color = Color::Red;
                    root = rotate_right(grandparent, root);
                }
            } else {
                // Mirror image of the branch above.
                let uncle = (*grandparent.as_ptr()).left;

                if is_red(uncle) {
                    (*parent.as_ptr()).color = Color::Black;
                    (*uncle.unwrap().as_ptr()).color = Color::Black;
                    (*grandparent.as_ptr()).color = Color::Red;
                    node = grandparent;
                } else {
                    if (*parent.as_ptr()).left == Some(node) {
                        node = parent;
                        root = rotate_right(node, root);
                    }

                    let parent = (*node.as_ptr()).parent.unwrap();
                    (*parent.as_ptr()).color = Color::Black;
                    (*grandparent.as_ptr()).color = Color::Red;
                    root = rotate_left(grandparent, root);
                }
            }
        }

        (*root.as_ptr()).color = Color::Black;
        (*anchor.as_ptr()).parent = Some(root);
    }
}

/// Unlinks `node` from the tree: three-case splice (leaf, one child,
/// two children replaced by the in-order successor with a color swap),
/// extreme-cache maintenance, then the deletion repair walk when a
/// black node left the tree. The node itself is not freed here.
pub(crate) unsafe fn tree_erase(
    node: NonNull<NodeBase>,
    anchor: NonNull<NodeBase>,
) {
    unsafe {
        let mut root = (*anchor.as_ptr()).parent;
        let mut successor = node;
        let mut child: Link;
        let mut child_parent: Link;

        if (*successor.as_ptr()).left.is_none() {
            // At most one child, possibly none.
            child = (*successor.as_ptr()).right;
        } else if (*successor.as_ptr()).right.is_none() {
            // Exactly one child.
            child = (*successor.as_ptr()).left;
        } else {
            // Two children: splice in the in-order successor instead.
            successor = min_node((*successor.as_ptr()).right.unwrap());
            child = (*successor.as_ptr()).right;
        }

        if successor == node {
            child_parent = (*successor.as_ptr()).parent;

            if let Some(child) = child {
                (*child.as_ptr()).parent = (*successor.as_ptr()).parent;
            }

            if Some(node) == root {
                root = child;
            } else {
                let parent = (*node.as_ptr()).parent.unwrap();
                if (*parent.as_ptr()).left == Some(node) {
                    (*parent.as_ptr()).left = child;
                } else {
                    (*parent.as_ptr()).right = child;
                }
            }

            if Some(node) == (*anchor.as_ptr()).left {
                // `node.left` is known absent here; the new minimum is
                // either under the replacement child or the parent
                // (the anchor itself when the tree just emptied).
                (*anchor.as_ptr()).left =
                    if (*node.as_ptr()).right.is_some() && child.is_some() {
                        Some(min_node(child.unwrap()))
                    } else {
                        (*node.as_ptr()).parent
                    };
            }
            if Some(node) == (*anchor.as_ptr()).right {
                (*anchor.as_ptr()).right =
                    if (*node.as_ptr()).left.is_some() && child.is_some() {
                        Some(max_node(child.unwrap()))
                    } else {
                        (*node.as_ptr()).parent
                    };
            }
        } else {
            // Relink the successor in place of `node`. The successor
            // sits in the right subtree, so only the left side needs
            // adopting unconditionally.
            (*(*node.as_ptr()).left.unwrap().as_ptr()).parent =
                Some(successor);
            (*successor.as_ptr()).left = (*node.as_ptr()).left;

            if Some(successor) == (*node.as_ptr()).right {
                child_parent = Some(successor);
            } else {
                child_parent = (*successor.as_ptr()).parent;

                if let Some(child) = child {
                    (*child.as_ptr()).parent = child_parent;
                }
                (*child_parent.unwrap().as_ptr()).left = child;

                (*successor.as_ptr()).right = (*node.as_ptr()).right;
                (*(*node.as_ptr()).right.unwrap().as_ptr()).parent =
                    Some(successor);
            }

            if Some(node) == root {
                root = Some(successor);
            } else {
                let parent = (*node.as_ptr()).parent.unwrap();
                if (*parent.as_ptr()).left == Some(node) {
                    (*parent.as_ptr()).left = Some(successor);
                } else {
                    (*parent.as_ptr()).right = Some(successor);
                }
            }

            (*successor.as_ptr()).parent = (*node.as_ptr()).parent;
            mem::swap(
                &mut (*successor.as_ptr()).color,
                &mut (*node.as_ptr()).color,
            );
        }

        // Removing a red node cannot change any black count; only a
        // removed black node requires the repair walk.
        if (*node.as_ptr()).color == Color::Black {
            while child != root && !is_red(child) {
                let cp = child_parent.unwrap();

                if (*cp.as_ptr()).left == child {
                    let mut temp = (*cp.as_ptr()).right.unwrap();

                    if (*temp.as_ptr()).color == Color::Red {
                        (*temp.as_ptr()).color = Color::Black;
                        (*cp.as_ptr()).color = Color::Red;
                        root = Some(rotate_left(cp, root.unwrap()));
                        temp = (*cp.as_ptr()).right.unwrap();
                    }

                    if !is_red((*temp.as_ptr()).left)
                        && !is_red((*temp.as_ptr()).right)
                    {
                        (*temp.as_ptr()).color = Color::Red;
                        child = Some(cp);
                        child_parent = (*cp.as_ptr()).parent;
                    } else {
                        if !is_red((*temp.as_ptr()).right) {
                            (*(*temp.as_ptr()).left.unwrap().as_ptr()).color =
                                Color::Black;
                            (*temp.as_ptr()).color = Color::Red;
                            root = Some(rotate_right(temp, root.unwrap()));
                            temp = (*cp.as_ptr()).right.unwrap();
                        }

                        (*temp.as_ptr()).color = (*cp.as_ptr()).color;
                        (*cp.as_ptr()).color = Color::Black;
                        if let Some(right) = (*temp.as_ptr()).right {
                            (*right.as_ptr()).color = Color::Black;
                        }

                        root = Some(rotate_left(cp, root.unwrap()));
                        break;
                    }
                } else {
                    // Mirror image of the branch above.
                    let mut temp = (*cp.as_ptr()).left.unwrap();

                    if (*temp.as_ptr()).color == Color::Red {
                        (*temp.as_ptr()).color = Color::Black;
                        (*cp.as_ptr()).color = Color::Red;
                        root = Some(rotate_right(cp, root.unwrap()));
                        temp = (*cp.as_ptr()).left.unwrap();
                    }

                    if !is_red((*temp.as_ptr()).right)
                        && !is_red((*temp.as_ptr()).left)
                    {
                        (*temp.as_ptr()).color = Color::Red;
                        child = Some(cp);
                        child_parent = (*cp.as_ptr()).parent;
                    } else {
                        if !is_red((*temp.as_ptr()).left) {
                            (*(*temp.as_ptr()).right.unwrap().as_ptr()).color =
                                Color::Black;
                            (*temp.as_ptr()).color = Color::Red;
                            root = Some(rotate_left(temp, root.unwrap()));
                            temp = (*cp.as_ptr()).left.unwrap();
                        }

                        (*temp.as_ptr()).color = (*cp.as_ptr()).color;
                        (*cp.as_ptr()).color = Color::Black;
                        if let Some(left) = (*temp.as_ptr()).left {
                            (*left.as_ptr()).color = Color::Black;
                        }

                        root = Some(rotate_right(cp, root.unwrap()));
                        break;
                    }
                }
            }

            if let Some(child) = child {
                (*child.as_ptr()).color = Color::Black;
            }
        }

        (*anchor.as_ptr()).parent = root;
    }
}

/// Black nodes on the path from `bottom` up to `top`, inclusive. Red
/// counts are irrelevant to balance, so only black nodes are counted.
#[cfg(test)]
pub(crate) unsafe fn black_count(
    top: NonNull<NodeBase>,
    bottom: NonNull<NodeBase>,
) -> usize {
    unsafe {
        let mut count = 0;
        let mut node = Some(bottom);
        while let Some(n) = node {
            if (*n.as_ptr()).color == Color::Black {
                count += 1;
            }
            if n == top {
                break;
            }
            node = (*n.as_ptr()).parent;
        }
        count
    }
}
