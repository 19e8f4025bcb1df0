//! Deterministic hashing helpers.
//!
//! Intern keys must be stable for the lifetime of a context, so every hasher
//! here is built from fixed seeds rather than per-process random state.

use ahash::RandomState;
use hashbrown::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

pub fn fast_map_with_capacity<K: Eq + Hash, V>(cap: usize) -> FastHashMap<K, V> {
    HashMap::with_capacity_and_hasher(cap, fast_hasher())
}

/// 64-bit content hash of a string.
#[inline]
pub fn hash_str(s: &str) -> u64 {
    let mut hasher = fast_hasher().build_hasher();
    hasher.write(s.as_bytes());
    hasher.finish()
}

/// 64-bit hash of a real number's bit pattern. `-0.0` and `0.0` share a key
/// and every NaN collapses onto one canonical NaN.
#[inline]
pub fn hash_f64(f: f64) -> u64 {
    let bits = if f == 0.0 {
        0u64
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    };
    let mut hasher = fast_hasher().build_hasher();
    hasher.write_u64(bits);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_is_stable() {
        assert_eq!(hash_str("pact"), hash_str("pact"));
        assert_ne!(hash_str("pact"), hash_str("tcap"));
    }

    #[test]
    fn real_hash_normalizes_zero_and_nan() {
        assert_eq!(hash_f64(0.0), hash_f64(-0.0));
        assert_eq!(hash_f64(f64::NAN), hash_f64(-f64::NAN));
        assert_ne!(hash_f64(1.5), hash_f64(2.5));
    }

    proptest::proptest! {
        #[test]
        fn equal_reals_share_a_key(f in proptest::num::f64::ANY) {
            proptest::prop_assert_eq!(hash_f64(f), hash_f64(f + 0.0));
        }

        #[test]
        fn string_hash_depends_only_on_content(s in "[ -~]{0,24}") {
            let (head, tail) = s.split_at(s.len() / 2);
            proptest::prop_assert_eq!(hash_str(&s), hash_str(&format!("{head}{tail}")));
        }
    }
}
