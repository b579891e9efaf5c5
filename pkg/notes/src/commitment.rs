use zk_primitives::{hash_elements, Element};

use crate::{Amounts, SpendingKey, MAX_TOKENS};

/// The commitment to a note: `hash(amounts[0], .., amounts[MAX_TOKENS - 1], public_key, blinding)`
///
/// This is the only part of a note that appears in the clear on the ledger, as a leaf of the
/// commitment tree.
#[must_use]
pub fn commitment(amounts: &Amounts, public_key: Element, blinding: Element) -> Element {
    let inputs: [Element; MAX_TOKENS + 2] = core::array::from_fn(|i| match i {
        i if i < MAX_TOKENS => amounts[i],
        MAX_TOKENS => public_key,
        _ => blinding,
    });

    hash_elements(inputs)
}

/// The nullifier that marks the note at `index` as spent: `hash(commitment, index, private_key)`
///
/// Only the owner can compute it, and it is unlinkable to the commitment without the key.
#[must_use]
pub fn nullifier(commitment: Element, index: u64, key: &SpendingKey) -> Element {
    hash_elements([commitment, Element::from(index), key.to_element()])
}
