/// Errors from inserting into or reading from an [`Accumulator`](crate::Accumulator)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Every leaf slot is already filled
    #[error("accumulator is full ({capacity} leaves)")]
    Full {
        /// The number of leaves the tree can hold
        capacity: u64,
    },

    /// An insertion named an index other than the next free slot
    #[error("expected insertion at index {expected}, got {actual}")]
    WrongIndex {
        /// The next free index (`num_leaves`)
        expected: u64,
        /// The index that was requested
        actual: u64,
    },

    /// A witness was requested for a leaf that has not been inserted
    #[error("leaf {index} has not been inserted (tree has {num_leaves} leaves)")]
    UnknownLeaf {
        /// The requested index
        index: u64,
        /// The number of leaves in the tree
        num_leaves: u64,
    },
}
