use serde::{Deserialize, Serialize};
use zk_primitives::Element;

/// A commitment appended to the ledger's tree, with the envelope published alongside it
///
/// Emitted by both deposits and transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Leaf index of the commitment
    pub index: u64,
    /// The note commitment
    pub commitment: Element,
    /// The packed envelope (or random bytes, for dummy outputs)
    #[serde(with = "hex::serde")]
    pub encrypted_data: Vec<u8>,
}
