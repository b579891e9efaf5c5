use ethereum_types::{H256, U256};
use notes::Amounts;
use prover::{DepositArgs, TransactArgs};
use web3::ethabi::Token;
use zk_primitives::Element;

pub fn convert_element_to_h256(element: Element) -> H256 {
    H256::from_slice(&element.to_be_bytes())
}

pub fn convert_element_to_u256(element: Element) -> U256 {
    U256::from_big_endian(&element.to_be_bytes())
}

pub fn convert_u256_to_element(value: U256) -> Element {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);

    Element::from_be_bytes(bytes)
}

fn uint(element: Element) -> Token {
    Token::Uint(convert_element_to_u256(element))
}

fn uints(elements: impl IntoIterator<Item = Element>) -> Vec<Token> {
    elements.into_iter().map(uint).collect()
}

fn byte_strings<'a>(data: impl IntoIterator<Item = &'a Vec<u8>>) -> Vec<Token> {
    data.into_iter().map(|bytes| Token::Bytes(bytes.clone())).collect()
}

pub fn amounts_token(amounts: &Amounts) -> Token {
    Token::FixedArray(uints(amounts.iter()))
}

/// The `DepositArgs` struct the pool's `deposit` takes
pub fn deposit_token(args: &DepositArgs) -> Token {
    Token::Tuple(vec![
        amounts_token(&args.deposit_amount),
        Token::FixedArray(uints(args.out_commitments)),
        Token::FixedArray(byte_strings(&args.encrypted_outputs)),
        Token::Bytes(args.proof.clone()),
    ])
}

/// The `TransactArgs` struct the pool's `transact` takes
pub fn transact_token(args: &TransactArgs) -> Token {
    Token::Tuple(vec![
        uint(args.root),
        amounts_token(&args.withdraw_amount),
        Token::Array(uints(args.in_nullifiers.iter().copied())),
        Token::Array(uints(args.out_commitments.iter().copied())),
        Token::Array(byte_strings(&args.encrypted_outputs)),
        Token::Bytes(args.proof.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_u256_conversion() {
        let element = Element::new(0x1234_abcd);
        let value = convert_element_to_u256(element);

        assert_eq!(value, U256::from(0x1234_abcd_u64));
        assert_eq!(convert_u256_to_element(value), element);
        assert_eq!(
            convert_element_to_h256(element).to_low_u64_be(),
            0x1234_abcd
        );
    }

    #[test]
    fn deposit_args_shape() {
        let args = DepositArgs {
            deposit_amount: Amounts::single(0, Element::new(100)).unwrap(),
            out_commitments: [Element::new(1), Element::new(2)],
            encrypted_outputs: [vec![1, 2], vec![3]],
            proof: vec![0xff],
        };

        let Token::Tuple(fields) = deposit_token(&args) else {
            panic!("deposit args must encode as a tuple");
        };

        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields[0].clone().into_fixed_array().unwrap()[0],
            Token::Uint(U256::from(100))
        );
        assert_eq!(fields[0].clone().into_fixed_array().unwrap().len(), notes::MAX_TOKENS);
        assert_eq!(fields[2], Token::FixedArray(vec![Token::Bytes(vec![1, 2]), Token::Bytes(vec![3])]));
        assert_eq!(fields[3], Token::Bytes(vec![0xff]));
    }

    #[test]
    fn transact_args_shape() {
        let args = TransactArgs {
            root: Element::new(9),
            withdraw_amount: Amounts::ZERO,
            in_nullifiers: vec![Element::new(5)],
            out_commitments: vec![Element::new(6), Element::new(7)],
            encrypted_outputs: vec![vec![], vec![]],
            proof: vec![],
        };

        let fields = transact_token(&args).into_tuple().unwrap();

        assert_eq!(fields[0], Token::Uint(U256::from(9)));
        assert_eq!(fields[2], Token::Array(vec![Token::Uint(U256::from(5))]));
        assert_eq!(fields[3].clone().into_array().unwrap().len(), 2);
    }
}
