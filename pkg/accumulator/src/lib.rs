#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! An append-only Merkle accumulator of note commitments
//!
//! Leaves are inserted strictly in order, starting at index 0. Unfilled leaves hold
//! [`Element::ZERO`], so the root of a partially filled tree is well defined:
//!
//! ```rust
//! # use accumulator::*;
//! let mut tree = Accumulator::<4>::new();
//! assert_eq!(tree.root(), empty_subtree_hash(4));
//!
//! tree.insert(Element::new(10)).unwrap();
//! tree.insert(Element::new(20)).unwrap();
//!
//! let witness = tree.witness(1).unwrap();
//! assert_eq!(witness.root(), tree.root());
//! assert!(witness.proves(Element::new(20)));
//! ```
//!
//! The depth is a const generic, mirroring the fixed depth the verifying circuits are compiled
//! with. A tree of depth `D` holds `2^D` leaves and produces witnesses with `D` siblings.

mod error;
mod hash;
mod tree;
mod witness;

use std::sync::Arc;

use parking_lot::RwLock;

pub use error::Error;
pub use hash::empty_subtree_hash;
pub use tree::Accumulator;
pub use witness::Witness;
pub use zk_primitives::Element;

/// Result alias for accumulator operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An [`Accumulator`] shared between the ledger observer (the only writer) and proof assemblers
///
/// Writers hold the write lock for a whole insertion, so readers never observe a half-updated
/// tree. Readers that need a root and several witnesses should take them under one read guard.
pub type SharedAccumulator<const DEPTH: usize> = Arc<RwLock<Accumulator<DEPTH>>>;

/// The largest depth an [`Accumulator`] can be created with
pub const MAX_DEPTH: usize = 63;
