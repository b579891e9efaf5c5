use ark_ff::PrimeField;
use ethnum::{uint, U256};

use crate::{Base, Element};

impl Element {
    /// The modulus of the BN254 scalar field
    pub const MODULUS: Element = Element(uint!(
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
    ));

    /// Convert this [`Element`] to its equivalent [`Base`] representation
    ///
    /// Non-canonical elements are reduced modulo [`Element::MODULUS`].
    #[inline]
    #[must_use]
    pub fn to_base(self) -> Base {
        Base::from_le_bytes_mod_order(&self.0.to_le_bytes())
    }

    /// Create an [`Element`] from a [`Base`]
    #[inline]
    #[must_use]
    pub fn from_base(base: Base) -> Element {
        let [a, b, c, d] = base.into_bigint().0;
        let lo = u128::from(a) | u128::from(b) << 64;
        let hi = u128::from(c) | u128::from(d) << 64;

        Self(U256::from_words(hi, lo))
    }

    /// Reduce this element modulo [`Element::MODULUS`]
    ///
    /// Elements in canonical form are guaranteed to be unchanged when converting to/from a [`Base`]
    #[inline]
    pub fn canonicalize(&mut self) {
        self.0 %= Self::MODULUS.0;
    }

    /// Whether this [`Element`] is strictly less than [`Element::MODULUS`]
    #[inline]
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.0 < Self::MODULUS.0
    }

    /// Sample a uniformly random canonical element
    ///
    /// Used for spending keys and blinding factors, so `rng` should be cryptographically secure
    #[cfg(feature = "rand")]
    #[inline]
    #[must_use]
    pub fn secure_random(mut rng: impl rand::RngCore + rand::CryptoRng) -> Element {
        Self::from_base(<Base as ark_ff::UniformRand>::rand(&mut rng))
    }
}

impl From<Base> for Element {
    fn from(value: Base) -> Self {
        Element::from_base(value)
    }
}

impl From<Element> for Base {
    fn from(value: Element) -> Self {
        value.to_base()
    }
}
