use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};
use zk_primitives::Element;

use crate::{Error, Result, MAX_TOKENS};

/// One amount per token slot
///
/// The slot a token occupies is assigned by the [`TokenRegistry`](crate::TokenRegistry). A
/// vector of any other length cannot be turned into [`Amounts`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amounts([Element; MAX_TOKENS]);

impl Amounts {
    /// No value in any slot
    pub const ZERO: Self = Self([Element::ZERO; MAX_TOKENS]);

    /// Wrap an array of amounts
    #[must_use]
    pub fn new(amounts: [Element; MAX_TOKENS]) -> Self {
        Self(amounts)
    }

    /// Build from a slice that must have exactly [`MAX_TOKENS`] entries
    pub fn from_slice(amounts: &[Element]) -> Result<Self> {
        let array = <[Element; MAX_TOKENS]>::try_from(amounts)
            .map_err(|_| Error::AmountsLength(amounts.len()))?;
        Ok(Self(array))
    }

    /// A single non-zero slot
    ///
    /// ```rust
    /// # use notes::*;
    /// let amounts = Amounts::single(2, Element::new(5)).unwrap();
    /// assert_eq!(amounts[2], Element::new(5));
    /// assert_eq!(amounts[0], Element::ZERO);
    ///
    /// assert!(Amounts::single(MAX_TOKENS, Element::new(5)).is_err());
    /// ```
    pub fn single(slot: usize, amount: Element) -> Result<Self> {
        let mut amounts = Self::ZERO;
        amounts.set(slot, amount)?;
        Ok(amounts)
    }

    /// The amount in `slot`
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<Element> {
        self.0.get(slot).copied()
    }

    /// Overwrite the amount in `slot`
    pub fn set(&mut self, slot: usize, amount: Element) -> Result<()> {
        let entry = self.0.get_mut(slot).ok_or(Error::SlotOutOfRange(slot))?;
        *entry = amount;
        Ok(())
    }

    /// The amounts as an array
    #[must_use]
    pub fn as_array(&self) -> &[Element; MAX_TOKENS] {
        &self.0
    }

    /// Iterate over the slots in order
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }

    /// Whether every slot is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|amount| amount.is_zero())
    }

    /// Fail if any slot holds a value outside the field
    pub fn ensure_canonical(&self) -> Result<()> {
        match self.0.iter().find(|amount| !amount.is_canonical()) {
            Some(amount) => Err(Error::NonCanonical(*amount)),
            None => Ok(()),
        }
    }

    /// Per-slot integer addition, `None` if any slot overflows 256 bits
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let mut sum = *self;

        for (slot, amount) in sum.0.iter_mut().zip(other.0) {
            *slot = slot.checked_add(amount)?;
        }

        Some(sum)
    }

    /// Per-slot sum of many amounts
    ///
    /// ```rust
    /// # use notes::*;
    /// let a = Amounts::single(0, Element::new(3)).unwrap();
    /// let b = Amounts::single(1, Element::new(4)).unwrap();
    ///
    /// let sum = Amounts::checked_sum([&a, &b, &a]).unwrap();
    /// assert_eq!(sum[0], Element::new(6));
    /// assert_eq!(sum[1], Element::new(4));
    /// ```
    #[must_use]
    pub fn checked_sum<'a, I: IntoIterator<Item = &'a Amounts>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |sum, amounts| sum.checked_add(amounts))
    }
}

impl From<[Element; MAX_TOKENS]> for Amounts {
    fn from(amounts: [Element; MAX_TOKENS]) -> Self {
        Self(amounts)
    }
}

impl TryFrom<Vec<Element>> for Amounts {
    type Error = Error;

    fn try_from(amounts: Vec<Element>) -> Result<Self> {
        Self::from_slice(&amounts)
    }
}

impl Index<usize> for Amounts {
    type Output = Element;

    fn index(&self, slot: usize) -> &Element {
        &self.0[slot]
    }
}

impl fmt::Debug for Amounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|amount| amount.to_decimal_string()))
            .finish()
    }
}
