use notes::Amounts;
use zk_primitives::Element;

/// Arguments of the ledger's `deposit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositArgs {
    /// The amount deposited in each token slot
    pub deposit_amount: Amounts,
    /// Commitments of the two new notes
    pub out_commitments: [Element; 2],
    /// Encrypted payloads of the two new notes
    pub encrypted_outputs: [Vec<u8>; 2],
    /// Proof bytes
    pub proof: Vec<u8>,
}

impl DepositArgs {
    /// The encrypted outputs as `0x`-prefixed hex strings
    #[must_use]
    pub fn encrypted_outputs_hex(&self) -> [String; 2] {
        let [first, second] = &self.encrypted_outputs;
        [first, second].map(|data| format!("0x{}", hex::encode(data)))
    }
}

/// Arguments of the ledger's `transact` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactArgs {
    /// The root the inputs were proven against
    pub root: Element,
    /// The amount leaving the pool in each token slot
    pub withdraw_amount: Amounts,
    /// Nullifiers of the spent notes
    pub in_nullifiers: Vec<Element>,
    /// Commitments of the new notes
    pub out_commitments: Vec<Element>,
    /// Encrypted payloads of the new notes
    pub encrypted_outputs: Vec<Vec<u8>>,
    /// Proof bytes
    pub proof: Vec<u8>,
}
