use light_poseidon::{Poseidon, PoseidonHasher};

use crate::{Base, Element};

/// The widest input [`hash_elements`] accepts
///
/// circomlib Poseidon over BN254 is parameterised for widths 2 to 13, i.e. 1 to 12 inputs. The
/// widest protocol hash is the commitment, with `MAX_TOKENS + 2 = 12` inputs.
pub const MAX_ARITY: usize = 12;

struct Arity<const N: usize>;

impl<const N: usize> Arity<N> {
    const SUPPORTED: () = assert!(N >= 1 && N <= MAX_ARITY, "unsupported Poseidon arity");
}

/// circomlib Poseidon of a fixed number of field elements
///
/// Every protocol hash goes through this function, with the arity fixed at compile time:
///  - public key: `hash_elements([private_key])`
///  - commitment: `hash_elements([amounts.., public_key, blinding])`
///  - nullifier: `hash_elements([commitment, index, private_key])`
///  - tree node: `hash_elements([left, right])`
///
/// The output matches circomlib's `Poseidon(N)` template and `circomlibjs`'s `buildPoseidon`, so
/// it agrees with the deposit and transaction circuits and with the on-chain tree.
///
/// Inputs should be canonical (see [`Element::is_canonical`]), otherwise they are reduced
/// modulo [`Element::MODULUS`] before hashing.
///
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_elements([Element::new(1), Element::new(2)]);
/// let b = hash_elements([Element::new(1), Element::new(3)]);
/// let c = hash_elements([Element::new(1), Element::new(2), Element::new(3)]);
///
/// assert_ne!(a, b);
/// assert_ne!(a, c);
/// ```
#[inline]
#[must_use]
pub fn hash_elements<const N: usize>(elements: [Element; N]) -> Element {
    let () = Arity::<N>::SUPPORTED;

    let inputs = elements.map(Element::to_base);
    let hash = Poseidon::<Base>::new_circom(N)
        .and_then(|mut poseidon| poseidon.hash(&inputs))
        .expect("arity is checked at compile time and inputs match it");

    Element::from_base(hash)
}

/// Hash a pair of tree nodes into their parent
///
/// The operation is not symmetric:
/// ```rust
/// # use zk_primitives::*;
/// let a = Element::new(1);
/// let b = Element::new(2);
///
/// assert_ne!(hash_pair(a, b), hash_pair(b, a));
/// ```
#[inline]
#[must_use]
pub fn hash_pair(left: Element, right: Element) -> Element {
    hash_elements([left, right])
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn matches_circomlib() {
        let expected: Element =
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
                .parse()
                .unwrap();

        assert_eq!(hash_elements([Element::new(1), Element::new(2)]), expected);
        assert_eq!(hash_pair(Element::new(1), Element::new(2)), expected);
    }

    #[test]
    fn hash_is_deterministic() {
        let mut rng = ChaChaRng::from_seed([0; 32]);

        for _ in 0..20 {
            let a = Element::secure_random(&mut rng);
            let b = Element::secure_random(&mut rng);

            assert_eq!(hash_pair(a, b), hash_pair(a, b));
            assert_eq!(hash_elements([a]), hash_elements([a]));
        }
    }

    #[test]
    fn arity_changes_the_hash() {
        let one = hash_elements([Element::ZERO]);
        let two = hash_elements([Element::ZERO, Element::ZERO]);
        let three = hash_elements([Element::ZERO, Element::ZERO, Element::ZERO]);

        assert_ne!(one, two);
        assert_ne!(two, three);
        assert_ne!(one, three);
    }

    #[test]
    fn widest_arity_hashes() {
        let inputs: [Element; MAX_ARITY] = core::array::from_fn(|i| Element::from(i as u64));
        let mut shifted = inputs;
        shifted[11] = Element::new(100);

        assert!(hash_elements(inputs).is_canonical());
        assert_ne!(hash_elements(inputs), hash_elements(shifted));
    }

    #[proptest]
    fn hash_output_is_canonical(a: Element, b: Element) {
        assert!(hash_pair(a, b).is_canonical());
    }
}
