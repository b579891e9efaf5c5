use crate::{hash_pair, Element};

/// Compute the root of a Merkle tree from a leaf and its authentication path
///
/// `siblings` yields `(sibling, is_right)` tuples in deepest-first order, where `is_right` is
/// `true` when the node being hashed upwards is the right child at that level (so the sibling
/// sits on its left).
///
/// A tree of depth `D` has `D` siblings between a leaf and the root:
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_pair(Element::new(0), Element::new(1));
/// let b = hash_pair(Element::new(2), Element::new(3));
/// let root = hash_pair(a, b);
///
/// // leaf 2 is the left child of `b`, and `b` is the right child of the root
/// let siblings = [(Element::new(3), false), (a, true)];
///
/// assert_eq!(compute_merkle_root(Element::new(2), siblings), root);
/// assert_ne!(compute_merkle_root(Element::ZERO, siblings), root);
/// ```
pub fn compute_merkle_root<I: IntoIterator<Item = (Element, bool)>>(
    mut node: Element,
    siblings: I,
) -> Element {
    for (sibling, is_right) in siblings {
        node = match is_right {
            false => hash_pair(node, sibling),
            true => hash_pair(sibling, node),
        };
    }

    node
}
