use zk_primitives::Element;

use crate::{
    constants::{ELEMENT_LENGTH, NOTE_PAYLOAD_LENGTH},
    Amounts, Error, Result,
};

/// The plaintext sealed inside a note envelope: the blinding factor and the amounts
///
/// Encoded as `blinding ‖ amounts[0] ‖ .. ‖ amounts[MAX_TOKENS - 1]`, each 32 bytes big-endian.
/// The public key is not included: the recipient already knows their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotePayload {
    /// The commitment blinding factor
    pub blinding: Element,
    /// The note's amounts
    pub amounts: Amounts,
}

impl NotePayload {
    /// Fixed-width encoding
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NOTE_PAYLOAD_LENGTH);
        bytes.extend_from_slice(&self.blinding.to_be_bytes());

        for amount in self.amounts.iter() {
            bytes.extend_from_slice(&amount.to_be_bytes());
        }

        bytes
    }

    /// Decode a payload, rejecting any length other than [`NOTE_PAYLOAD_LENGTH`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != NOTE_PAYLOAD_LENGTH {
            return Err(Error::PayloadLength {
                expected: NOTE_PAYLOAD_LENGTH,
                actual: bytes.len(),
            });
        }

        let elements = bytes
            .chunks_exact(ELEMENT_LENGTH)
            .map(|chunk| -> Result<Element> {
                let element = Element::from_be_slice(chunk)?;
                match element.is_canonical() {
                    true => Ok(element),
                    false => Err(Error::NonCanonical(element)),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blinding: elements[0],
            amounts: Amounts::from_slice(&elements[1..])?,
        })
    }
}
