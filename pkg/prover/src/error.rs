use std::time::Duration;

use zk_primitives::Element;

use crate::CircuitKind;

/// Result alias for proof assembly
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while assembling inputs or proving
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A note was malformed or not finalized
    #[error("note error: {0}")]
    Notes(#[from] notes::Error),

    /// The local tree could not produce a witness
    #[error("accumulator error: {0}")]
    Accumulator(#[from] accumulator::Error),

    /// No circuit exists for this number of inputs and outputs
    #[error("no circuit for {inputs} inputs and {outputs} outputs")]
    UnsupportedShape {
        /// The number of inputs
        inputs: usize,
        /// The number of outputs
        outputs: usize,
    },

    /// A deposit's outputs don't add up to the deposit amount
    #[error("deposit of {expected} in slot {slot} but outputs hold {actual}")]
    DepositMismatch {
        /// The token slot
        slot: usize,
        /// The amount declared for the slot
        expected: Element,
        /// The sum of the outputs in the slot
        actual: Element,
    },

    /// A transfer's inputs don't equal its outputs plus the withdrawal
    #[error("slot {slot} is unbalanced: inputs hold {inputs}, outputs and withdrawal need {outputs}")]
    Unbalanced {
        /// The token slot
        slot: usize,
        /// The sum of the inputs in the slot
        inputs: Element,
        /// The sum of the outputs and withdrawal in the slot
        outputs: Element,
    },

    /// Summing amounts left the field
    #[error("amounts overflow the field")]
    Overflow,

    /// The same note is spent twice in one transfer
    #[error("input with nullifier {0} is spent twice")]
    DuplicateInput(Element),

    /// An input's commitment is not the leaf at its index
    #[error("input at index {index} is not in the local tree")]
    InputNotInTree {
        /// The index the input claims
        index: u64,
    },

    /// The prover failed
    #[error("{circuit} prover error: {source}")]
    Prover {
        /// The circuit being proved
        circuit: CircuitKind,
        /// The underlying failure
        #[source]
        source: ProverError,
    },

    /// The prover did not finish in time
    #[error("{circuit} prover timed out after {timeout:?}")]
    Timeout {
        /// The circuit being proved
        circuit: CircuitKind,
        /// The configured bound
        timeout: Duration,
    },
}

/// Errors reported by a [`Prover`](crate::Prover) implementation
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    /// The proving backend could not be run
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The proving backend exited unsuccessfully
    #[error("prover failed: {0}")]
    Failed(String),

    /// The backend's output could not be read
    #[error("malformed prover output: {0}")]
    Malformed(String),

    /// Serializing the circuit input failed
    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
