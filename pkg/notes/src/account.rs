use std::collections::HashSet;

use rand::{CryptoRng, RngCore};
use tracing::warn;
use zk_primitives::Element;

use crate::{
    nullifier, Address, Amounts, EncryptionKey, Envelope, Error, NotePayload, Result,
    SpendingKey, UtxoInput, UtxoOutput,
};

/// An account that can see what is addressed to it and spend it
///
/// Holds the spending key and the notes discovered so far.
#[derive(Debug, Clone)]
pub struct OwnedAccount {
    key: SpendingKey,
    address: Address,
    utxos: Vec<UtxoInput>,
}

impl OwnedAccount {
    /// A new account with a fresh spending key
    #[must_use]
    pub fn random() -> Self {
        Self::random_with(rand::thread_rng())
    }

    /// A new account with a spending key drawn from `rng`
    #[must_use]
    pub fn random_with(rng: impl RngCore + CryptoRng) -> Self {
        Self::from_key(SpendingKey::random(rng))
    }

    /// Restore an account from its spending key
    #[must_use]
    pub fn from_key(key: SpendingKey) -> Self {
        let address = Address::new(key.public_key(), key.encryption_key());

        Self {
            key,
            address,
            utxos: Vec::new(),
        }
    }

    /// The account's address
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// The spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.address.public_key()
    }

    /// The encryption key incoming notes are sealed to
    #[must_use]
    pub fn encryption_key(&self) -> EncryptionKey {
        self.address.encryption_key()
    }

    /// The spending key
    #[must_use]
    pub fn spending_key(&self) -> &SpendingKey {
        &self.key
    }

    /// Every note discovered so far, spent or not
    #[must_use]
    pub fn utxos(&self) -> &[UtxoInput] {
        &self.utxos
    }

    /// Notes whose nullifier is not in `spent`
    pub fn unspent<'a>(
        &'a self,
        spent: &'a HashSet<Element>,
    ) -> impl Iterator<Item = &'a UtxoInput> + 'a {
        self.utxos
            .iter()
            .filter(move |utxo| !spent.contains(&utxo.nullifier()))
    }

    /// Per-slot total of every discovered note, `None` on overflow
    #[must_use]
    pub fn balance(&self) -> Option<Amounts> {
        Amounts::checked_sum(self.utxos.iter().map(UtxoInput::amounts))
    }

    /// The nullifier for a note of this account at `index`
    #[must_use]
    pub fn nullifier_for(&self, commitment: Element, index: u64) -> Element {
        nullifier(commitment, index, &self.key)
    }

    /// Create an unfinalized output paying `amounts` to `address`
    #[must_use]
    pub fn pay(&self, address: Address, amounts: Amounts) -> UtxoOutput {
        UtxoOutput::new(address, amounts)
    }

    /// Create an unfinalized output paying `amounts` back to this account
    #[must_use]
    pub fn pay_self(&self, amounts: Amounts) -> UtxoOutput {
        self.pay(self.address, amounts)
    }

    /// Try to open a published note
    ///
    /// Fails if the envelope is malformed, was sealed to another key, or does not open
    /// `commitment`.
    pub fn try_decrypt(&self, commitment: Element, data: &[u8], index: u64) -> Result<UtxoInput> {
        let plaintext = Envelope::from_bytes(data)?.open(&self.key)?;
        let payload = NotePayload::from_bytes(&plaintext)?;

        let input = UtxoInput::new(&self.key, payload.amounts, payload.blinding, index);

        if input.commitment() != commitment {
            return Err(Error::CommitmentMismatch {
                expected: commitment,
                actual: input.commitment(),
            });
        }

        Ok(input)
    }

    /// Open a published note and keep it if it belongs to this account
    ///
    /// Returns the new note, or `None` if the note is not ours or is already known (the same
    /// index can be announced twice when historical replay overlaps the live stream).
    pub fn attempt_decrypt_and_add(
        &mut self,
        commitment: Element,
        data: &[u8],
        index: u64,
    ) -> Option<UtxoInput> {
        if self.utxos.iter().any(|utxo| utxo.index() == index) {
            return None;
        }

        match self.try_decrypt(commitment, data, index) {
            Ok(input) => {
                self.utxos.push(input.clone());
                Some(input)
            }
            Err(error @ Error::CommitmentMismatch { .. }) => {
                warn!(index, %error, "ignoring note that does not open its commitment");
                None
            }
            Err(_) => None,
        }
    }

    /// Record an output this account paid to itself, once its tree index is known
    pub fn promote(&mut self, output: &UtxoOutput, index: u64) -> Result<UtxoInput> {
        let input = UtxoInput::from_output(output, index, &self.key)?;

        if !self.utxos.iter().any(|utxo| utxo.index() == index) {
            self.utxos.push(input.clone());
        }

        Ok(input)
    }
}

/// An account known only by its address: notes can be paid to it, nothing more
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewableAccount {
    address: Address,
}

impl ViewableAccount {
    /// Wrap a recipient's address
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// The account's address
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Create an unfinalized output paying `amounts` to this account
    #[must_use]
    pub fn pay(&self, amounts: Amounts) -> UtxoOutput {
        UtxoOutput::new(self.address, amounts)
    }
}

/// An account, tagged with what this process can do with it
///
/// Spending and decryption are only available on [`Account::Owned`].
#[derive(Debug, Clone)]
pub enum Account {
    /// We hold the spending key
    Owned(OwnedAccount),
    /// We only know the address
    Viewable(ViewableAccount),
}

impl Account {
    /// A new owned account
    #[must_use]
    pub fn random() -> Self {
        Self::Owned(OwnedAccount::random())
    }

    /// A viewable account for `address`
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        Self::Viewable(ViewableAccount::new(address))
    }

    /// The account's address
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Self::Owned(account) => account.address(),
            Self::Viewable(account) => account.address(),
        }
    }

    /// The spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.address().public_key()
    }

    /// Whether we hold the spending key
    #[must_use]
    pub fn can_spend(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// The owned account, if we hold the key
    #[must_use]
    pub fn as_owned(&self) -> Option<&OwnedAccount> {
        match self {
            Self::Owned(account) => Some(account),
            Self::Viewable(_) => None,
        }
    }

    /// The owned account, mutably
    pub fn as_owned_mut(&mut self) -> Option<&mut OwnedAccount> {
        match self {
            Self::Owned(account) => Some(account),
            Self::Viewable(_) => None,
        }
    }
}

impl From<OwnedAccount> for Account {
    fn from(account: OwnedAccount) -> Self {
        Self::Owned(account)
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self::from_address(address)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;

    fn accounts() -> (OwnedAccount, OwnedAccount) {
        let mut rng = ChaChaRng::from_seed([9; 32]);
        (
            OwnedAccount::random_with(&mut rng),
            OwnedAccount::random_with(&mut rng),
        )
    }

    fn sent(to: Address, amounts: Amounts) -> (Element, Vec<u8>) {
        let mut output = UtxoOutput::new(to, amounts);
        output.finalize(true).unwrap();
        (
            output.commitment().unwrap(),
            output.encrypted_data().unwrap().to_vec(),
        )
    }

    #[test]
    fn recipient_discovers_note_and_others_do_not() {
        let (mut alice, mut bob) = accounts();
        let amounts = Amounts::single(0, Element::new(10)).unwrap();
        let (commitment, data) = sent(alice.address(), amounts);

        assert!(bob.attempt_decrypt_and_add(commitment, &data, 0).is_none());
        let note = alice.attempt_decrypt_and_add(commitment, &data, 0).unwrap();

        assert_eq!(note.amounts(), &amounts);
        assert_eq!(note.commitment(), commitment);
        assert_eq!(note.nullifier(), alice.nullifier_for(commitment, 0));
        assert_eq!(alice.utxos().len(), 1);
        assert!(bob.utxos().is_empty());
    }

    #[test]
    fn replayed_notes_are_not_added_twice() {
        let (mut alice, _) = accounts();
        let (commitment, data) = sent(alice.address(), Amounts::ZERO);

        assert!(alice.attempt_decrypt_and_add(commitment, &data, 4).is_some());
        assert!(alice.attempt_decrypt_and_add(commitment, &data, 4).is_none());
        assert_eq!(alice.utxos().len(), 1);
    }

    #[test]
    fn mismatched_commitment_is_rejected() {
        let (mut alice, _) = accounts();
        let (commitment, data) = sent(alice.address(), Amounts::ZERO);
        let wrong = commitment.checked_add(Element::ONE).unwrap();

        assert!(matches!(
            alice.try_decrypt(wrong, &data, 0),
            Err(Error::CommitmentMismatch { .. })
        ));
        assert!(alice.attempt_decrypt_and_add(wrong, &data, 0).is_none());
        assert!(alice.utxos().is_empty());
    }

    #[test]
    fn garbage_is_not_mine() {
        let (mut alice, _) = accounts();

        assert!(alice.attempt_decrypt_and_add(Element::ONE, &[1, 2, 3], 0).is_none());
        assert!(alice.attempt_decrypt_and_add(Element::ONE, &[0; 400], 1).is_none());
    }

    #[test]
    fn balance_and_unspent() {
        let (mut alice, _) = accounts();

        let (c0, d0) = sent(alice.address(), Amounts::single(0, Element::new(10)).unwrap());
        let (c1, d1) = sent(alice.address(), Amounts::single(0, Element::new(5)).unwrap());
        alice.attempt_decrypt_and_add(c0, &d0, 0).unwrap();
        alice.attempt_decrypt_and_add(c1, &d1, 1).unwrap();

        assert_eq!(alice.balance().unwrap()[0], Element::new(15));

        let spent = HashSet::from([alice.nullifier_for(c0, 0)]);
        let unspent: Vec<_> = alice.unspent(&spent).map(UtxoInput::index).collect();
        assert_eq!(unspent, vec![1]);
    }

    #[test]
    fn promoted_outputs_become_inputs() {
        let (mut alice, bob) = accounts();

        let mut change = alice.pay_self(Amounts::single(1, Element::new(3)).unwrap());
        change.finalize(true).unwrap();
        let input = alice.promote(&change, 12).unwrap();

        assert_eq!(input.commitment(), change.commitment().unwrap());
        assert_eq!(alice.utxos().len(), 1);

        let mut to_bob = alice.pay(bob.address(), Amounts::ZERO);
        to_bob.finalize(true).unwrap();
        assert_eq!(alice.promote(&to_bob, 13), Err(Error::NotOwner));
    }

    #[test]
    fn capability_tags() {
        let (alice, _) = accounts();
        let address = alice.address();

        let owned = Account::from(alice);
        let viewable = Account::from(address);

        assert!(owned.can_spend());
        assert!(!viewable.can_spend());
        assert!(viewable.as_owned().is_none());
        assert_eq!(owned.address(), viewable.address());
        assert_eq!(owned.public_key(), address.public_key());
    }
}
