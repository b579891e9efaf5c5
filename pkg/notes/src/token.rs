use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{Error, Result, MAX_TOKENS};

/// An ERC-20 token contract address
pub type Token = ethereum_types::H160;

/// The bijection between token contracts and note slots
///
/// Slots are assigned once and never move: a token registered at one slot cannot be registered
/// at another, and a slot cannot be reused for a different token. Registration is safe to call
/// concurrently; the check and the insert happen under one write lock.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    inner: RwLock<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    by_token: HashMap<Token, usize>,
    by_slot: [Option<Token>; MAX_TOKENS],
}

impl TokenRegistry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `token` to `slot`
    ///
    /// Registering the same pair twice is a no-op.
    ///
    /// ```rust
    /// # use notes::*;
    /// let registry = TokenRegistry::new();
    /// let dai = Token::repeat_byte(1);
    ///
    /// registry.register(dai, 0).unwrap();
    /// registry.register(dai, 0).unwrap();
    ///
    /// assert!(registry.register(dai, 1).is_err());
    /// assert_eq!(registry.slot_of(dai).unwrap(), 0);
    /// ```
    pub fn register(&self, token: Token, slot: usize) -> Result<()> {
        if slot >= MAX_TOKENS {
            return Err(Error::SlotOutOfRange(slot));
        }

        let mut slots = self.inner.write();

        if let Some(&existing) = slots.by_token.get(&token) {
            return match existing == slot {
                true => Ok(()),
                false => Err(Error::TokenSlotConflict {
                    token,
                    existing,
                    requested: slot,
                }),
            };
        }

        if let Some(existing) = slots.by_slot[slot] {
            return Err(Error::SlotTaken { slot, existing });
        }

        slots.by_token.insert(token, slot);
        slots.by_slot[slot] = Some(token);

        Ok(())
    }

    /// Assign `token` to the lowest free slot, returning it
    ///
    /// If the token is already registered its existing slot is returned.
    pub fn register_next(&self, token: Token) -> Result<usize> {
        let mut slots = self.inner.write();

        if let Some(&existing) = slots.by_token.get(&token) {
            return Ok(existing);
        }

        let slot = slots
            .by_slot
            .iter()
            .position(Option::is_none)
            .ok_or(Error::RegistryFull)?;

        slots.by_token.insert(token, slot);
        slots.by_slot[slot] = Some(token);

        Ok(slot)
    }

    /// The slot assigned to `token`
    pub fn slot_of(&self, token: Token) -> Result<usize> {
        self.inner
            .read()
            .by_token
            .get(&token)
            .copied()
            .ok_or(Error::UnknownToken(token))
    }

    /// The token assigned to `slot`
    #[must_use]
    pub fn token_at(&self, slot: usize) -> Option<Token> {
        self.inner.read().by_slot.get(slot).copied().flatten()
    }

    /// The number of registered tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_token.len()
    }

    /// Whether no tokens are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
