#![deny(clippy::disallowed_methods)]

//! Client for the shielded pool contract and the ERC20 tokens it holds

mod client;
mod erc20;
mod error;
mod event;
pub mod util;
mod zk_erc20;

pub use client::Client;
pub use erc20::Erc20Contract;
pub use error::{Error, Result};
pub use event::{decode_note_event, COMMITMENT_EVENT, DEPOSIT_EVENT};
pub use zk_erc20::ZkErc20Contract;

pub use web3::{
    signing::SecretKey,
    types::{Address, H256, U256},
};
