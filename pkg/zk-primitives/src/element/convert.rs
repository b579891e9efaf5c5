use crate::Element;
use core::num::{ParseIntError, TryFromIntError};
use ethnum::U256;
use std::str::FromStr;

/// A byte slice that was not exactly [`Element::BYTES`] long
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected {} bytes for an element, got {0}", Element::BYTES)]
pub struct WidthError(pub usize);

macro_rules! from_int_impls {
    ($t:ty) => {
        impl From<$t> for Element {
            #[inline]
            fn from(value: $t) -> Self {
                Element(U256::from(value))
            }
        }

        impl TryFrom<Element> for $t {
            type Error = TryFromIntError;

            #[inline]
            fn try_from(value: Element) -> Result<Self, Self::Error> {
                <$t>::try_from(value.0)
            }
        }
    };
}

from_int_impls!(u8);
from_int_impls!(u16);
from_int_impls!(u32);
from_int_impls!(u64);
from_int_impls!(u128);

/// `0x`-prefixed strings are parsed as hex, anything else as decimal
impl FromStr for Element {
    type Err = ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(hex) => Ok(Self(U256::from_str_radix(hex, 16)?)),
            None => Ok(Self(U256::from_str_radix(s, 10)?)),
        }
    }
}

impl From<U256> for Element {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<Element> for U256 {
    fn from(value: Element) -> Self {
        value.0
    }
}

impl Element {
    /// Convert the [`Element`] to its bytes in big-endian format
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::ZERO.to_be_bytes(), [0; 32]);
    ///
    /// let mut one = [0; 32];
    /// one[31] = 1;
    /// assert_eq!(Element::ONE.to_be_bytes(), one);
    /// ```
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// Convert big-endian bytes into an [`Element`]
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// Read an [`Element`] from a big-endian slice that must be exactly 32 bytes long
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::from_be_slice(&[0; 32]), Ok(Element::ZERO));
    /// assert_eq!(Element::from_be_slice(&[0; 31]), Err(WidthError(31)));
    /// ```
    #[inline]
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, WidthError> {
        let array = <[u8; 32]>::try_from(bytes).map_err(|_| WidthError(bytes.len()))?;
        Ok(Self::from_be_bytes(array))
    }
}
