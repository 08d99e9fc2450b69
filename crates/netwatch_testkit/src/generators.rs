//! Property-based test generators.

use proptest::prelude::*;

/// Strategy producing plausible validator public keys.
///
/// Real keys are base32 strings starting with `G`; for diff and
/// membership tests a short uppercase suffix is enough to make keys
/// distinct and readable in failure output.
pub fn public_key() -> impl Strategy<Value = String> {
    "[A-Z2-7]{8}".prop_map(|suffix| format!("G{suffix}"))
}

/// Strategy producing a membership set of 1 to `max` distinct keys.
pub fn membership_set(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set(public_key(), 1..=max)
        .prop_map(|keys| keys.into_iter().collect())
}

/// Strategy producing a permutation of `items`.
///
/// Useful for asserting that ordering carries no meaning in set-compared
/// fields.
pub fn permutation_of(items: Vec<String>) -> impl Strategy<Value = Vec<String>> {
    Just(items).prop_shuffle()
}
