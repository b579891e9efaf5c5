#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

//! A shielded multi-asset pool client
//!
//! Wires the note model, the local commitment tree, proof assembly and a ledger together:
//! [`Config`] loads settings, [`init_tracing`] sets up logging, and [`Shield`] deposits,
//! transfers and withdraws on behalf of tracked accounts.

mod config;
mod error;
mod ledger;
mod shield;
mod tracing_setup;

pub use config::{Config, LogFormat};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use shield::{connect, Shield};
pub use tracing_setup::init_tracing;
