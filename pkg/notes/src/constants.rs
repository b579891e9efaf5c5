//! Protocol constants shared with the deployed circuits and ledger contract

/// Number of token slots in every note
pub const MAX_TOKENS: usize = 10;

/// Depth of the ledger's commitment tree
pub const TREE_DEPTH: usize = 20;

/// Number of outputs produced by a deposit
pub const DEPOSIT_OUTPUTS: usize = 2;

/// Width of a field element in every fixed-width encoding
pub const ELEMENT_LENGTH: usize = 32;

/// Width of an x25519 key
pub const KEY_LENGTH: usize = 32;

/// Width of an xsalsa20 nonce
pub const NONCE_LENGTH: usize = 24;

/// Width of a poly1305 authentication tag
pub const TAG_LENGTH: usize = 16;

/// `public_key ‖ encryption_key`
pub const ADDRESS_LENGTH: usize = ELEMENT_LENGTH + KEY_LENGTH;

/// `blinding ‖ amounts[0] ‖ .. ‖ amounts[MAX_TOKENS - 1]`
pub const NOTE_PAYLOAD_LENGTH: usize = ELEMENT_LENGTH * (MAX_TOKENS + 1);

/// `nonce ‖ ephemeral_key ‖ ciphertext`, where the ciphertext carries the payload and its tag
pub const ENVELOPE_LENGTH: usize = NONCE_LENGTH + KEY_LENGTH + NOTE_PAYLOAD_LENGTH + TAG_LENGTH;

/// The envelope scheme, as named by the ecosystem wallets that implement it
pub const ENCRYPTION_VERSION: &str = "x25519-xsalsa20-poly1305";
