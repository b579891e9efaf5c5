use zk_primitives::{hash_pair, Element};

use crate::{empty_subtree_hash, Error, Result, Witness, MAX_DEPTH};

/// An append-only Merkle tree of depth `DEPTH`
///
/// Nodes are stored level by level: `levels[0]` holds the leaves, `levels[DEPTH]` holds the
/// root once anything has been inserted. Nodes that have never been written are implicitly
/// [`empty_subtree_hash`] of their height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator<const DEPTH: usize> {
    levels: Vec<Vec<Element>>,
}

impl<const DEPTH: usize> Default for Accumulator<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> Accumulator<DEPTH> {
    /// Create an empty tree
    ///
    /// # Panics
    ///
    /// Panics if `DEPTH` is 0 or greater than [`MAX_DEPTH`]
    #[must_use]
    pub fn new() -> Self {
        assert!(
            (1..=MAX_DEPTH).contains(&DEPTH),
            "depth must be in 1..={MAX_DEPTH}, got {DEPTH}"
        );

        Self {
            levels: vec![Vec::new(); DEPTH + 1],
        }
    }

    /// Build a tree by inserting `leaves` in order
    ///
    /// ```rust
    /// # use accumulator::*;
    /// let tree = Accumulator::<1>::from_leaves([Element::new(10), Element::new(20)]).unwrap();
    /// assert_eq!(tree.root(), zk_primitives::hash_pair(Element::new(10), Element::new(20)));
    /// ```
    pub fn from_leaves<I: IntoIterator<Item = Element>>(leaves: I) -> Result<Self> {
        let mut tree = Self::new();
        tree.extend(leaves)?;
        Ok(tree)
    }

    /// The number of leaves this tree can hold (`2^DEPTH`)
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        1 << DEPTH
    }

    /// The number of leaves inserted so far, which is also the index of the next insertion
    #[inline]
    #[must_use]
    pub fn num_leaves(&self) -> u64 {
        self.levels[0].len() as u64
    }

    /// Whether no leaves have been inserted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// The current root
    #[inline]
    #[must_use]
    pub fn root(&self) -> Element {
        self.node(DEPTH, 0)
    }

    /// The leaf at `index`, if it has been inserted
    #[inline]
    #[must_use]
    pub fn leaf(&self, index: u64) -> Option<Element> {
        let index = usize::try_from(index).ok()?;
        self.levels[0].get(index).copied()
    }

    /// All inserted leaves, in index order
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Element] {
        &self.levels[0]
    }

    /// Append a leaf at index [`num_leaves`](Self::num_leaves), returning that index
    ///
    /// ```rust
    /// # use accumulator::*;
    /// let mut tree = Accumulator::<1>::new();
    ///
    /// assert_eq!(tree.insert(Element::new(1)), Ok(0));
    /// assert_eq!(tree.insert(Element::new(2)), Ok(1));
    /// assert_eq!(tree.insert(Element::new(3)), Err(Error::Full { capacity: 2 }));
    /// ```
    pub fn insert(&mut self, leaf: Element) -> Result<u64> {
        let index = self.num_leaves();

        if index >= self.capacity() {
            return Err(Error::Full {
                capacity: self.capacity(),
            });
        }

        self.levels[0].push(leaf);

        let mut position = self.levels[0].len() - 1;
        for height in 0..DEPTH {
            let parent = position / 2;
            let left = self.node(height, parent * 2);
            let right = self.node(height, parent * 2 + 1);
            self.set(height + 1, parent, hash_pair(left, right));
            position = parent;
        }

        Ok(index)
    }

    /// Insert a leaf, failing if `index` is not the next free slot
    ///
    /// ```rust
    /// # use accumulator::*;
    /// let mut tree = Accumulator::<4>::new();
    ///
    /// let error = tree.insert_at(1, Element::new(5)).unwrap_err();
    /// assert_eq!(error, Error::WrongIndex { expected: 0, actual: 1 });
    ///
    /// tree.insert_at(0, Element::new(5)).unwrap();
    /// ```
    pub fn insert_at(&mut self, index: u64, leaf: Element) -> Result<()> {
        let expected = self.num_leaves();

        if index != expected {
            return Err(Error::WrongIndex {
                expected,
                actual: index,
            });
        }

        self.insert(leaf).map(|_| ())
    }

    /// Insert every leaf from `leaves` in order
    pub fn extend<I: IntoIterator<Item = Element>>(&mut self, leaves: I) -> Result<()> {
        for leaf in leaves {
            self.insert(leaf)?;
        }

        Ok(())
    }

    /// Produce the authentication path for the leaf at `index` against the current root
    pub fn witness(&self, index: u64) -> Result<Witness<DEPTH>> {
        let leaf = self.leaf(index).ok_or(Error::UnknownLeaf {
            index,
            num_leaves: self.num_leaves(),
        })?;

        // `leaf` succeeded, so the index fits in a usize
        let position = index as usize;
        let siblings = core::array::from_fn(|height| self.node(height, (position >> height) ^ 1));

        Ok(Witness {
            root: self.root(),
            leaf,
            index,
            siblings,
        })
    }

    fn node(&self, height: usize, position: usize) -> Element {
        self.levels[height]
            .get(position)
            .copied()
            .unwrap_or_else(|| empty_subtree_hash(height))
    }

    fn set(&mut self, height: usize, position: usize, hash: Element) {
        let level = &mut self.levels[height];

        match position.cmp(&level.len()) {
            core::cmp::Ordering::Less => level[position] = hash,
            core::cmp::Ordering::Equal => level.push(hash),
            core::cmp::Ordering::Greater => {
                unreachable!("nodes are written left to right, so there are no gaps")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, prelude::*};
    use test_strategy::proptest;
    use zk_primitives::hash_pair;

    use super::*;

    #[test]
    fn depth_one_root() {
        let tree = Accumulator::<1>::from_leaves([Element::new(10), Element::new(20)]).unwrap();
        assert_eq!(tree.root(), hash_pair(Element::new(10), Element::new(20)));
    }

    #[test]
    fn partial_tree_pads_with_zero() {
        let mut tree = Accumulator::<2>::new();
        tree.insert(Element::new(1)).unwrap();

        let left = hash_pair(Element::new(1), Element::ZERO);
        let right = hash_pair(Element::ZERO, Element::ZERO);
        assert_eq!(tree.root(), hash_pair(left, right));

        tree.insert(Element::new(2)).unwrap();
        tree.insert(Element::new(3)).unwrap();

        let left = hash_pair(Element::new(1), Element::new(2));
        let right = hash_pair(Element::new(3), Element::ZERO);
        assert_eq!(tree.root(), hash_pair(left, right));
    }

    #[test]
    fn depth_eight_proof_for_index_22() {
        let leaves = (0..40).map(|i| Element::new(i * 7 + 1));
        let tree = Accumulator::<8>::from_leaves(leaves).unwrap();

        let witness = tree.witness(22).unwrap();

        assert_eq!(witness.leaf(), Element::new(22 * 7 + 1));
        assert_eq!(witness.path_indices(), 22);
        assert_eq!(witness.siblings().len(), 8);
        assert!(witness.proves(Element::new(22 * 7 + 1)));
        assert!(!witness.proves(Element::new(0)));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut tree = Accumulator::<2>::new();
        for i in 0..4 {
            assert_eq!(tree.insert(Element::new(i)), Ok(i));
        }

        assert_eq!(tree.insert(Element::new(4)), Err(Error::Full { capacity: 4 }));
        assert_eq!(tree.num_leaves(), 4);
    }

    #[test]
    fn witness_for_missing_leaf_fails() {
        let tree = Accumulator::<4>::from_leaves([Element::new(1)]).unwrap();

        assert_eq!(
            tree.witness(1).unwrap_err(),
            Error::UnknownLeaf {
                index: 1,
                num_leaves: 1
            }
        );
    }

    #[test]
    fn failed_insert_at_leaves_tree_untouched() {
        let mut tree = Accumulator::<4>::from_leaves([Element::new(1)]).unwrap();
        let root = tree.root();

        assert!(tree.insert_at(3, Element::new(2)).is_err());
        assert_eq!(tree.root(), root);
        assert_eq!(tree.num_leaves(), 1);
    }

    #[test]
    #[should_panic = "depth must be in"]
    fn zero_depth_panics() {
        let _ = Accumulator::<0>::new();
    }

    #[proptest(ProptestConfig::with_cases(32))]
    fn every_witness_proves_its_leaf(
        #[strategy(vec(any::<Element>(), 1..40))] leaves: Vec<Element>,
    ) {
        let tree = Accumulator::<6>::from_leaves(leaves.iter().copied()).unwrap();

        for (index, leaf) in leaves.iter().enumerate() {
            let witness = tree.witness(index as u64).unwrap();

            assert_eq!(witness.root(), tree.root());
            assert_eq!(witness.compute_root(*leaf), tree.root());
        }
    }

    #[proptest(ProptestConfig::with_cases(32))]
    fn old_witnesses_go_stale(a: Element, b: Element) {
        let mut tree = Accumulator::<4>::from_leaves([a]).unwrap();
        let witness = tree.witness(0).unwrap();

        tree.insert(b).unwrap();

        // the path is still valid for the root it was taken against
        assert_eq!(witness.compute_root(a), witness.root());
        assert_ne!(witness.root(), tree.root());
    }
}
