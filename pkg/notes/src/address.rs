use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zk_primitives::Element;

use crate::{
    constants::{ADDRESS_LENGTH, ELEMENT_LENGTH},
    EncryptionKey, Error, Result, SpendingKey,
};

/// Everything a payer needs to send a note: `public_key (32, big-endian) ‖ encryption_key (32)`
///
/// ```rust
/// # use notes::*;
/// let account = OwnedAccount::random();
/// let hex = account.address().to_string();
///
/// assert_eq!(hex.len(), 2 + 128);
/// assert_eq!(hex.parse::<Address>().unwrap(), account.address());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    public_key: Element,
    encryption_key: EncryptionKey,
}

impl Address {
    /// Build an address from its parts
    #[must_use]
    pub fn new(public_key: Element, encryption_key: EncryptionKey) -> Self {
        Self {
            public_key,
            encryption_key,
        }
    }

    /// The address dummy outputs are sent to: public key 0 with the all-zero key's
    /// encryption key
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Element::ZERO, SpendingKey::zero().encryption_key())
    }

    /// The spending public key
    #[must_use]
    pub fn public_key(&self) -> Element {
        self.public_key
    }

    /// The x25519 encryption key
    #[must_use]
    pub fn encryption_key(&self) -> EncryptionKey {
        self.encryption_key
    }

    /// The 64-byte encoding
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        let mut bytes = [0; ADDRESS_LENGTH];
        bytes[..ELEMENT_LENGTH].copy_from_slice(&self.public_key.to_be_bytes());
        bytes[ELEMENT_LENGTH..].copy_from_slice(self.encryption_key.as_bytes());
        bytes
    }

    /// Decode a 64-byte address
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ADDRESS_LENGTH {
            return Err(Error::AddressLength {
                expected: ADDRESS_LENGTH,
                actual: bytes.len(),
            });
        }

        let (public_key, encryption_key) = bytes.split_at(ELEMENT_LENGTH);

        let public_key = Element::from_be_slice(public_key)?;
        if !public_key.is_canonical() {
            return Err(Error::NonCanonical(public_key));
        }

        let mut key = [0; 32];
        key.copy_from_slice(encryption_key);

        Ok(Self::new(public_key, EncryptionKey::from_bytes(key)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
