use zk_primitives::Element;

use crate::{commitment, nullifier, Amounts, Error, Result, SpendingKey, UtxoOutput};

/// A note in the commitment tree that its owner can spend
///
/// Carries everything the transaction circuit needs to prove ownership: the opening of the
/// commitment, the leaf index and the spending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoInput {
    commitment: Element,
    amounts: Amounts,
    blinding: Element,
    index: u64,
    key: SpendingKey,
    nullifier: Element,
}

impl UtxoInput {
    /// Rebuild an input from its opening and tree index
    #[must_use]
    pub fn new(key: &SpendingKey, amounts: Amounts, blinding: Element, index: u64) -> Self {
        let commitment = commitment(&amounts, key.public_key(), blinding);

        Self {
            commitment,
            amounts,
            blinding,
            index,
            nullifier: nullifier(commitment, index, key),
            key: key.clone(),
        }
    }

    /// Turn a finalized output paid to `key` into an input, once its tree index is known
    pub fn from_output(output: &UtxoOutput, index: u64, key: &SpendingKey) -> Result<Self> {
        let commitment = output.commitment()?;

        if output.public_key() != key.public_key() {
            return Err(Error::NotOwner);
        }

        let input = Self::new(key, *output.amounts(), output.blinding(), index);
        debug_assert_eq!(input.commitment, commitment);

        Ok(input)
    }

    /// The note commitment
    #[must_use]
    pub fn commitment(&self) -> Element {
        self.commitment
    }

    /// The note's amounts
    #[must_use]
    pub fn amounts(&self) -> &Amounts {
        &self.amounts
    }

    /// The commitment blinding factor
    #[must_use]
    pub fn blinding(&self) -> Element {
        self.blinding
    }

    /// The leaf index of the commitment
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The nullifier published when this note is spent
    #[must_use]
    pub fn nullifier(&self) -> Element {
        self.nullifier
    }

    /// The owner's spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.key.public_key()
    }

    /// The owner's private key, a private input of the transaction circuit
    #[must_use]
    pub fn private_key(&self) -> Element {
        self.key.to_element()
    }
}
