use std::sync::OnceLock;

use zk_primitives::{hash_pair, Element};

use crate::MAX_DEPTH;

/// The root of an empty subtree of the given height
///
///  - `empty_subtree_hash(0) = Element::ZERO` (an unfilled leaf)
///  - `empty_subtree_hash(h) = hash_pair(empty_subtree_hash(h - 1), empty_subtree_hash(h - 1))`
///
/// Heights up to [`MAX_DEPTH`] are computed once and cached.
///
/// # Panics
///
/// Panics if `height` is greater than [`MAX_DEPTH`]
#[inline]
#[must_use]
pub fn empty_subtree_hash(height: usize) -> Element {
    assert!(
        height <= MAX_DEPTH,
        "height {height} exceeds the maximum depth {MAX_DEPTH}"
    );

    get_cache()[height]
}

fn get_cache() -> &'static [Element] {
    static CACHE: OnceLock<Vec<Element>> = OnceLock::new();

    CACHE.get_or_init(|| {
        let mut vec = Vec::with_capacity(MAX_DEPTH + 1);
        let mut hash = Element::ZERO;
        vec.push(hash);

        for _ in 0..MAX_DEPTH {
            hash = hash_pair(hash, hash);
            vec.push(hash);
        }

        vec
    })
}
