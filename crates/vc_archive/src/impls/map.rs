use alloc::collections::BTreeMap;
use core::hash::{BuildHasher, Hash};

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// Implements [`Archive`] for a map type as an associative array.
///
/// The map's address identifies it, so the same map reached twice is
/// archived once. Entries are read back in archived order.
macro_rules! impl_archive_for_map {
    ($map:ty, <$($param:ident),*> where $($bound:tt)*) => {
        impl<$($param),*> Archive for $map
        where
            $($bound)*
        {
            #[inline]
            fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
                s.write_map(core::ptr::from_ref(self).addr(), self.iter(), key)
            }

            fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
                Ok(d.read_entries(key)?.into_iter().collect())
            }

            #[inline]
            fn fallback() -> Option<Self> {
                Some(<$map>::default())
            }
        }
    };
}

impl_archive_for_map!(
    BTreeMap<K, V>, <K, V>
    where K: Archive + Ord, V: Archive
);

impl_archive_for_map!(
    hashbrown::HashMap<K, V, S>, <K, V, S>
    where K: Archive + Eq + Hash, V: Archive, S: BuildHasher + Default + 'static
);

#[cfg(feature = "std")]
impl_archive_for_map!(
    std::collections::HashMap<K, V, S>, <K, V, S>
    where K: Archive + Eq + Hash, V: Archive, S: BuildHasher + Default + 'static
);
