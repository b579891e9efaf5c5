#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Turns notes and tree witnesses into circuit inputs, runs them through a [`Prover`], and
//! packages the result as arguments for the ledger's `deposit` and `transact` calls
//!
//! Proving is expensive, so the [`Assembler`] checks everything the circuit would check
//! before it calls the prover: circuit shape, per-slot conservation of value, canonical field
//! elements, and membership of every input in the local tree.

mod args;
mod assembler;
mod circuit;
mod error;
mod input;
mod proof;
mod signal;
mod snarkjs;

pub use args::{DepositArgs, TransactArgs};
pub use assembler::Assembler;
pub use circuit::CircuitKind;
pub use error::{Error, ProverError, Result};
pub use input::{CircuitInput, DepositInput, TransactionInput};
pub use proof::{CallData, Proof, Prover};
pub use signal::Signal;
pub use snarkjs::{parse_call_data, SnarkjsProver};
