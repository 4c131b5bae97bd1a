use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

// -----------------------------------------------------------------------------
// String

impl Archive for String {
    #[inline]
    fn type_name() -> &'static str {
        "string"
    }

    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_string(self, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_string(key)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(String::new())
    }
}

// -----------------------------------------------------------------------------
// Vec and arrays

impl<T: Archive> Archive for Vec<T> {
    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_array(self, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        d.read_array(key)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: Archive, const N: usize> Archive for [T; N] {
    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        s.write_array(self.as_slice(), key)
    }

    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        let items = d.read_array::<T>(key)?;
        <[T; N]>::try_from(items).map_err(|items: Vec<T>| {
            Error::malformed(format!(
                "array `{key}` has {} elements, expected {N}",
                items.len()
            ))
        })
    }

    fn fallback() -> Option<Self> {
        let items = (0..N).map(|_| T::fallback()).collect::<Option<Vec<T>>>()?;
        <[T; N]>::try_from(items).ok()
    }
}

// -----------------------------------------------------------------------------
// Box

/// Boxes are transparent: the content is archived in place.
impl<T: Archive> Archive for Box<T> {
    #[inline]
    fn type_name() -> &'static str {
        T::type_name()
    }

    #[inline]
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        (**self).serialize(s, key)
    }

    #[inline]
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        T::deserialize(d, key).map(Box::new)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        T::fallback().map(Box::new)
    }
}
