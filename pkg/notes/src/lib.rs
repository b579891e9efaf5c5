#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Shielded notes: keys, addresses, commitments, nullifiers and note encryption
//!
//! A note holds one amount per token slot and is owned by whoever knows the spending key behind
//! its public key. On the ledger a note only appears as its commitment plus an encrypted
//! envelope that its owner can open:
//!
//! ```rust
//! # use notes::*;
//! let mut alice = OwnedAccount::random();
//! let bob = OwnedAccount::random();
//!
//! let mut output = bob.pay(alice.address(), Amounts::single(0, 100u64.into()).unwrap());
//! output.finalize(true).unwrap();
//!
//! let commitment = output.commitment().unwrap();
//! let data = output.encrypted_data().unwrap();
//!
//! let note = alice.attempt_decrypt_and_add(commitment, data, 0).unwrap();
//! assert_eq!(note.amounts()[0], 100u64);
//! ```

mod account;
mod address;
mod amounts;
mod commitment;
pub mod constants;
mod envelope;
mod error;
mod input;
mod keys;
mod output;
mod payload;
mod token;

pub use account::{Account, OwnedAccount, ViewableAccount};
pub use address::Address;
pub use amounts::Amounts;
pub use commitment::{commitment, nullifier};
pub use constants::{MAX_TOKENS, TREE_DEPTH};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use input::UtxoInput;
pub use keys::{EncryptionKey, SpendingKey};
pub use output::{zero_output, UtxoOutput};
pub use payload::NotePayload;
pub use token::{Token, TokenRegistry};
pub use zk_primitives::Element;
