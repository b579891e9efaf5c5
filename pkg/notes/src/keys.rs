use std::fmt;

use crypto_box::{PublicKey, SecretKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zk_primitives::{hash_elements, Element};

use crate::{Error, Result};

/// The secret that authorizes spending and decrypts incoming notes
///
/// Everything else an account publishes is derived from it:
///  - the spending public key `hash([private_key])`, committed into every note it owns
///  - the x25519 encryption key, using the 32-byte big-endian key as the x25519 secret
#[derive(Clone, PartialEq, Eq)]
pub struct SpendingKey(Element);

impl SpendingKey {
    /// Sample a fresh key
    #[must_use]
    pub fn random(rng: impl RngCore + CryptoRng) -> Self {
        Self(Element::secure_random(rng))
    }

    /// Use an existing field element as a key
    pub fn from_element(element: Element) -> Result<Self> {
        if !element.is_canonical() {
            return Err(Error::NonCanonical(element));
        }

        Ok(Self(element))
    }

    /// The all-zero key, which backs the address dummy outputs are sent to
    pub(crate) fn zero() -> Self {
        Self(Element::ZERO)
    }

    /// The raw private key
    #[must_use]
    pub fn to_element(&self) -> Element {
        self.0
    }

    /// The spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        hash_elements([self.0])
    }

    /// The x25519 public key notes for this key are encrypted to
    #[must_use]
    pub fn encryption_key(&self) -> EncryptionKey {
        EncryptionKey(self.box_secret().public_key().to_bytes())
    }

    pub(crate) fn box_secret(&self) -> SecretKey {
        SecretKey::from(self.0.to_be_bytes())
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpendingKey(..)")
    }
}

/// An x25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptionKey(#[serde(with = "hex::serde")] [u8; 32]);

impl EncryptionKey {
    /// Wrap raw key bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn to_box_key(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({})", hex::encode(self.0))
    }
}
