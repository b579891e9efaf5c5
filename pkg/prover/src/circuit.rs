use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The circuits the protocol proves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitKind {
    /// Two fresh outputs funded by a public deposit
    Deposit,
    /// One input, one output
    Transaction1x1,
    /// One input, two outputs
    Transaction1x2,
    /// Two inputs, two outputs
    Transaction2x2,
}

impl CircuitKind {
    /// The transaction circuit for this number of inputs and outputs
    pub fn transaction(inputs: usize, outputs: usize) -> Result<Self> {
        match (inputs, outputs) {
            (1, 1) => Ok(Self::Transaction1x1),
            (1, 2) => Ok(Self::Transaction1x2),
            (2, 2) => Ok(Self::Transaction2x2),
            _ => Err(Error::UnsupportedShape { inputs, outputs }),
        }
    }

    /// The number of inputs and outputs the circuit takes
    #[must_use]
    pub fn shape(self) -> (usize, usize) {
        match self {
            Self::Deposit => (0, notes::constants::DEPOSIT_OUTPUTS),
            Self::Transaction1x1 => (1, 1),
            Self::Transaction1x2 => (1, 2),
            Self::Transaction2x2 => (2, 2),
        }
    }

    /// The circuit's build name, used to locate its artifacts
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Transaction1x1 => "Transaction1x1",
            Self::Transaction1x2 => "Transaction1x2",
            Self::Transaction2x2 => "Transaction2x2",
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
