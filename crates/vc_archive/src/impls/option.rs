use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

/// `None` is archived as a `null` node typed with `T`'s name; `Some` is
/// transparent.
impl<T: Archive> Archive for Option<T> {
    #[inline]
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
        match self {
            Some(value) => value.serialize(s, key),
            None => s.write_null(T::type_name(), key),
        }
    }

    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
        if d.is_null(key)? {
            return Ok(None);
        }
        T::deserialize(d, key).map(Some)
    }

    #[inline]
    fn fallback() -> Option<Self> {
        Some(None)
    }
}
