use std::iter::zip;

use zk_primitives::{compute_merkle_root, Element};

/// A Merkle authentication path for one leaf of an [`Accumulator`](crate::Accumulator)
///
/// A witness is taken against the root at the time it was produced. Later insertions change the
/// root, so a witness should be used together with the [`root`](Self::root) it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness<const DEPTH: usize> {
    pub(crate) root: Element,
    pub(crate) leaf: Element,
    pub(crate) index: u64,
    pub(crate) siblings: [Element; DEPTH],
}

impl<const DEPTH: usize> Witness<DEPTH> {
    /// The root this witness was taken against
    #[inline]
    #[must_use]
    pub fn root(&self) -> Element {
        self.root
    }

    /// The leaf this witness was taken for
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Element {
        self.leaf
    }

    /// The index of the leaf
    #[inline]
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Siblings from the leaf level upwards
    #[inline]
    #[must_use]
    pub fn siblings(&self) -> &[Element; DEPTH] {
        &self.siblings
    }

    /// Bit `i` is `true` when the path node at level `i` is a right child
    ///
    /// ```rust
    /// # use accumulator::*;
    /// let tree = Accumulator::<3>::from_leaves((0..6).map(Element::new)).unwrap();
    /// let witness = tree.witness(5).unwrap();
    ///
    /// // 5 = 0b101
    /// assert_eq!(witness.path_bits(), [true, false, true]);
    /// ```
    #[inline]
    #[must_use]
    pub fn path_bits(&self) -> [bool; DEPTH] {
        core::array::from_fn(|height| (self.index >> height) & 1 == 1)
    }

    /// The path bits packed into an integer, least significant bit first
    ///
    /// For a binary tree this is the leaf index itself.
    #[inline]
    #[must_use]
    pub fn path_indices(&self) -> u64 {
        self.index
    }

    /// The root a tree would have if `leaf` sat at this witness's position
    #[must_use]
    pub fn compute_root(&self, leaf: Element) -> Element {
        compute_merkle_root(leaf, zip(self.siblings, self.path_bits()))
    }

    /// Whether this witness proves that `leaf` is in the tree with root [`root`](Self::root)
    #[inline]
    #[must_use]
    pub fn proves(&self, leaf: Element) -> bool {
        self.compute_root(leaf) == self.root
    }
}
