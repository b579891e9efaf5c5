#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Field elements and the circomlib Poseidon hash shared by every part of the shielded note
//! protocol
//!
//! Commitments, nullifiers, public keys and Merkle nodes are all [`Element`]s produced by
//! [`hash_elements`].

mod element;
mod hash;
mod path;

pub use element::{Element, WidthError};
pub use hash::{hash_elements, hash_pair, MAX_ARITY};
pub use path::compute_merkle_root;

/// The base element used by cryptographic operations
///
/// This is (roughly) an integer modulo `p` where `p` is [`Element::MODULUS`]
pub type Base = ark_bn254::Fr;
