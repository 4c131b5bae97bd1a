//! Hash containers used by the session tables and the registry.
//!
//! All maps share [`FixedHashState`], a `foldhash` state with a fixed seed,
//! so that iteration order only depends on the inserted keys.

use core::any::TypeId;
use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// Fixed Hash State based upon a random but fixed seed.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Containers

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T> = hashbrown::HashSet<T, FixedHashState>;

/// A map keyed by [`TypeId`].
pub type TypeIdMap<V> = HashMap<TypeId, V>;

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;

    use super::{FixedHashState, HashMap};

    #[test]
    fn fixed_state_is_stable() {
        let a = FixedHashState.hash_one(42_u64);
        let b = FixedHashState.hash_one(42_u64);
        assert_eq!(a, b);
    }

    #[test]
    fn map_with_fixed_state() {
        let mut map: HashMap<u64, &str> = HashMap::with_hasher(FixedHashState);
        map.insert(1, "one");
        assert_eq!(map.get(&1), Some(&"one"));
    }
}
