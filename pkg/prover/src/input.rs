use serde::{Deserialize, Serialize};

use crate::Signal;

/// Private and public inputs of the deposit circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInput {
    /// Per-output amount vectors
    pub out_amounts: Vec<Vec<Signal>>,
    /// Per-output owner public keys
    pub out_pubkeys: Vec<Signal>,
    /// Per-output blindings
    pub out_blindings: Vec<Signal>,
    /// Per-output commitments (public)
    pub out_commitments: Vec<Signal>,
    /// The amount deposited in each token slot (public)
    pub deposit_amount: Vec<Signal>,
}

/// Private and public inputs of a transaction circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// Commitments of the notes being spent
    pub in_commitment: Vec<Signal>,
    /// Amount vectors of the notes being spent
    pub in_amount: Vec<Vec<Signal>>,
    /// Blindings of the notes being spent
    pub in_blinding: Vec<Signal>,
    /// Leaf index of each spent note, read as a bit path from the leaf
    pub in_path_indices: Vec<Signal>,
    /// Sibling hashes of each spent note, leaf level first
    pub in_path_elements: Vec<Vec<Signal>>,
    /// Spending keys of the notes being spent
    pub in_private_key: Vec<Signal>,
    /// Amount vectors of the new notes
    pub out_amount: Vec<Vec<Signal>>,
    /// Owner public keys of the new notes
    pub out_pubkey: Vec<Signal>,
    /// Blindings of the new notes
    pub out_blinding: Vec<Signal>,
    /// The tree root every input is proven against (public)
    pub in_root: Signal,
    /// Commitments of the new notes (public)
    pub out_commitment: Vec<Signal>,
    /// Nullifiers of the notes being spent (public)
    pub in_nullifier: Vec<Signal>,
    /// The amount leaving the pool in each token slot (public)
    pub withdraw_amount: Vec<Signal>,
}

/// The input of any circuit, serialized as the bare input object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CircuitInput {
    /// See [`DepositInput`]
    Deposit(DepositInput),
    /// See [`TransactionInput`]
    Transaction(TransactionInput),
}

impl From<DepositInput> for CircuitInput {
    fn from(input: DepositInput) -> Self {
        Self::Deposit(input)
    }
}

impl From<TransactionInput> for CircuitInput {
    fn from(input: TransactionInput) -> Self {
        Self::Transaction(input)
    }
}
