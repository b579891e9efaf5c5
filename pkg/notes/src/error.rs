use zk_primitives::{Element, WidthError};

use crate::Token;

/// Result alias for note operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building, encoding or decrypting notes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An address had the wrong number of bytes
    #[error("address must be {expected} bytes, got {actual}")]
    AddressLength {
        /// Required length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// A hex string could not be decoded
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// An element was encoded with the wrong width
    #[error(transparent)]
    Width(#[from] WidthError),

    /// An amounts vector did not have one entry per token slot
    #[error("amounts must have {} entries, got {0}", crate::MAX_TOKENS)]
    AmountsLength(usize),

    /// A token slot outside `0..MAX_TOKENS`
    #[error("token slot {0} is out of range")]
    SlotOutOfRange(usize),

    /// A value that must be a field element was not reduced
    #[error("{0} is not a canonical field element")]
    NonCanonical(Element),

    /// A decrypted note payload had the wrong length
    #[error("note payload must be {expected} bytes, got {actual}")]
    PayloadLength {
        /// Required length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// An envelope too short to hold a nonce, ephemeral key and tag
    #[error("encrypted envelope is too short ({0} bytes)")]
    EnvelopeLength(usize),

    /// Sealing a note failed
    #[error("failed to encrypt note")]
    Encryption,

    /// The envelope was not addressed to this key, or was tampered with
    #[error("failed to decrypt note")]
    Decryption,

    /// A note decrypted, but does not open the commitment it was published with
    #[error("decrypted note commits to {actual}, but was published as {expected}")]
    CommitmentMismatch {
        /// Commitment observed on the ledger
        expected: Element,
        /// Commitment recomputed from the plaintext
        actual: Element,
    },

    /// An output was mutated or finalized after being finalized
    #[error("output has already been finalized")]
    AlreadyFinalized,

    /// An output's commitment or ciphertext was read before finalization
    #[error("output has not been finalized")]
    NotFinalized,

    /// An output was promoted to an input by a key that does not own it
    #[error("output is not owned by this key")]
    NotOwner,

    /// A token with no slot in the registry
    #[error("token {0:?} is not registered")]
    UnknownToken(Token),

    /// A token re-registered at a different slot
    #[error("token {token:?} is already registered at slot {existing}, cannot move it to {requested}")]
    TokenSlotConflict {
        /// The token
        token: Token,
        /// Its current slot
        existing: usize,
        /// The slot requested
        requested: usize,
    },

    /// A slot already assigned to another token
    #[error("slot {slot} is already assigned to token {existing:?}")]
    SlotTaken {
        /// The slot requested
        slot: usize,
        /// The token already there
        existing: Token,
    },

    /// Every slot has a token
    #[error("token registry is full")]
    RegistryFull,
}
