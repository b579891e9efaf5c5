use rand::{CryptoRng, RngCore};
use zk_primitives::Element;

use crate::{
    commitment, constants::ENVELOPE_LENGTH, Address, Amounts, Envelope, Error, NotePayload,
    Result, Token, TokenRegistry,
};

/// A note being created for a recipient
///
/// Amounts may be adjusted until [`finalize`](Self::finalize) computes the commitment and
/// ciphertext. After that the output is frozen: a second finalize or any mutation fails with
/// [`Error::AlreadyFinalized`].
#[derive(Debug, Clone)]
pub struct UtxoOutput {
    recipient: Address,
    amounts: Amounts,
    blinding: Element,
    sealed: Option<Sealed>,
}

#[derive(Debug, Clone)]
struct Sealed {
    commitment: Element,
    encrypted_data: Vec<u8>,
}

impl UtxoOutput {
    /// A new output with a fresh blinding factor
    #[must_use]
    pub fn new(recipient: Address, amounts: Amounts) -> Self {
        Self::with_rng(recipient, amounts, rand::thread_rng())
    }

    /// Like [`new`](Self::new), drawing the blinding factor from `rng`
    #[must_use]
    pub fn with_rng(recipient: Address, amounts: Amounts, rng: impl RngCore + CryptoRng) -> Self {
        Self {
            recipient,
            amounts,
            blinding: Element::secure_random(rng),
            sealed: None,
        }
    }

    /// The recipient's address
    #[must_use]
    pub fn recipient(&self) -> Address {
        self.recipient
    }

    /// The recipient's spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.recipient.public_key()
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

    /// Set the amount in one slot
    pub fn set_amount(&mut self, slot: usize, amount: Element) -> Result<()> {
        self.ensure_open()?;
        self.amounts.set(slot, amount)
    }

    /// Set the amount of `token`, looking its slot up in `registry`
    pub fn set_token_amount(
        &mut self,
        registry: &TokenRegistry,
        token: Token,
        amount: Element,
    ) -> Result<()> {
        self.ensure_open()?;
        let slot = registry.slot_of(token)?;
        self.amounts.set(slot, amount)
    }

    /// Compute the commitment and the encrypted payload
    ///
    /// With `real = false` the payload is random bytes of the same length as a real envelope,
    /// so dummy outputs are indistinguishable on the ledger.
    pub fn finalize(&mut self, real: bool) -> Result<()> {
        self.finalize_with_rng(real, rand::thread_rng())
    }

    /// Like [`finalize`](Self::finalize), drawing randomness from `rng`
    pub fn finalize_with_rng(&mut self, real: bool, mut rng: impl RngCore + CryptoRng) -> Result<()> {
        self.ensure_open()?;
        self.amounts.ensure_canonical()?;

        let encrypted_data = match real {
            true => {
                let payload = NotePayload {
                    blinding: self.blinding,
                    amounts: self.amounts,
                };

                Envelope::seal(&self.recipient.encryption_key(), &payload.to_bytes(), &mut rng)?
                    .to_bytes()
            }
            false => random_envelope(&mut rng),
        };

        self.sealed = Some(Sealed {
            commitment: commitment(&self.amounts, self.public_key(), self.blinding),
            encrypted_data,
        });

        Ok(())
    }

    /// Whether [`finalize`](Self::finalize) has run
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.sealed.is_some()
    }

    /// The commitment, available once finalized
    pub fn commitment(&self) -> Result<Element> {
        self.sealed
            .as_ref()
            .map(|sealed| sealed.commitment)
            .ok_or(Error::NotFinalized)
    }

    /// The packed envelope, available once finalized
    pub fn encrypted_data(&self) -> Result<&[u8]> {
        self.sealed
            .as_ref()
            .map(|sealed| sealed.encrypted_data.as_slice())
            .ok_or(Error::NotFinalized)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.sealed {
            Some(_) => Err(Error::AlreadyFinalized),
            None => Ok(()),
        }
    }
}

/// A finalized output of zero value to the zero address, used to pad fixed fan-out
///
/// ```rust
/// # use notes::*;
/// let dummy = zero_output();
///
/// assert!(dummy.is_finalized());
/// assert!(dummy.amounts().is_zero());
/// assert_eq!(dummy.recipient(), Address::zero());
/// ```
#[must_use]
pub fn zero_output() -> UtxoOutput {
    let mut rng = rand::thread_rng();
    let mut output = UtxoOutput::with_rng(Address::zero(), Amounts::ZERO, &mut rng);

    output.sealed = Some(Sealed {
        commitment: commitment(&output.amounts, output.public_key(), output.blinding),
        encrypted_data: random_envelope(&mut rng),
    });

    output
}

fn random_envelope(rng: &mut impl RngCore) -> Vec<u8> {
    let mut bytes = vec![0; ENVELOPE_LENGTH];
    rng.fill_bytes(&mut bytes);
    bytes
}
