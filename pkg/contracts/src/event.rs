use sha3::{Digest, Keccak256};
use web3::{
    ethabi::{self, ParamType},
    types::{Log, H256},
};
use zk_primitives::Element;

use crate::{util::convert_u256_to_element, Error, Result};
use observer::NoteEvent;

/// Emitted for every note created by `transact`
pub const COMMITMENT_EVENT: &str = "Commitment(uint256,uint256,bytes)";

/// Emitted for every note created by `deposit`
pub const DEPOSIT_EVENT: &str = "Deposit(uint256,uint256,bytes)";

pub(crate) fn note_topics() -> Vec<H256> {
    [COMMITMENT_EVENT, DEPOSIT_EVENT]
        .into_iter()
        .map(|signature| H256::from_slice(&Keccak256::digest(signature)))
        .collect()
}

/// Decode a `Commitment` or `Deposit` log into a [`NoteEvent`]
pub fn decode_note_event(log: &Log) -> Result<NoteEvent> {
    let tokens = ethabi::decode(
        &[ParamType::Uint(256), ParamType::Uint(256), ParamType::Bytes],
        &log.data.0,
    )?;

    let malformed = |what: &str| Error::MalformedEvent(what.to_owned());

    let mut tokens = tokens.into_iter();
    let commitment = tokens
        .next()
        .and_then(ethabi::Token::into_uint)
        .ok_or_else(|| malformed("missing commitment"))?;
    let index = tokens
        .next()
        .and_then(ethabi::Token::into_uint)
        .ok_or_else(|| malformed("missing index"))?;
    let encrypted_data = tokens
        .next()
        .and_then(ethabi::Token::into_bytes)
        .ok_or_else(|| malformed("missing encrypted data"))?;

    let commitment: Element = convert_u256_to_element(commitment);
    if !commitment.is_canonical() {
        return Err(malformed("commitment is not a field element"));
    }

    if index.bits() > 64 {
        return Err(malformed("index does not fit in 64 bits"));
    }

    Ok(NoteEvent {
        index: index.as_u64(),
        commitment,
        encrypted_data,
    })
}
