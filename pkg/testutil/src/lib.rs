//! In-memory stand-ins for the external prover and the ledger contract

mod ledger;
mod prover;

pub use ledger::{LedgerError, MockLedger};
pub use prover::MockProver;

use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

/// A deterministic rng for tests
pub fn rng(seed: u8) -> ChaChaRng {
    ChaChaRng::from_seed([seed; 32])
}
