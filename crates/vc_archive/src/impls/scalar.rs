use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::value::ScalarValue;
use crate::{Archive, Error};

macro_rules! impl_archive_for_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Archive for $ty {
            /// The wire name of the scalar kind.
            #[inline]
            fn type_name() -> &'static str {
                <$ty as ScalarValue>::KIND.name()
            }

            #[inline]
            fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
                s.write_scalar(*self, key)
            }

            #[inline]
            fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
                d.read_scalar(key)
            }

            #[inline]
            fn fallback() -> Option<Self> {
                Some(<$ty>::default())
            }
        }
    )*};
}

impl_archive_for_scalar!(
    bool, i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, isize, usize, f32, f64, char,
);

#[cfg(test)]
mod tests {
    use crate::Archive;

    #[test]
    fn wire_names() {
        assert_eq!(<u8 as Archive>::type_name(), "ubyte");
        assert_eq!(<i128 as Archive>::type_name(), "cent");
        assert_eq!(<usize as Archive>::type_name(), "ulong");
        assert_eq!(<char as Archive>::fallback(), Some('\0'));
    }
}
