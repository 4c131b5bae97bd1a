//! Type-erased descriptors passed between the engine and a backend.
//!
//! - [`Id`]: the identity of an emitted node.
//! - [`Scalar`] and [`ScalarKind`]: leaf values and their wire names.
//! - [`Array`]: an address range, used to detect slices.
//! - [`Slice`]: what a contained array is archived as.

use core::any::TypeId;
use core::fmt;
use core::mem::size_of;

// -----------------------------------------------------------------------------
// Id

/// Session-unique number assigned to every emitted node in traversal order.
pub type Id = u64;

// -----------------------------------------------------------------------------
// ScalarKind

macro_rules! scalar_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// The kind of a [`Scalar`], named after its wire tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ScalarKind {
            $($variant,)*
        }

        impl ScalarKind {
            /// All scalar kinds, in wire-table order.
            pub const ALL: &'static [ScalarKind] = &[$(ScalarKind::$variant,)*];

            /// The tag a backend uses for this kind.
            #[inline]
            pub const fn name(self) -> &'static str {
                match self {
                    $(ScalarKind::$variant => $name,)*
                }
            }

            /// Resolves a tag back to its kind.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ScalarKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

scalar_kinds! {
    Bool => "bool",
    Byte => "byte",
    UByte => "ubyte",
    Short => "short",
    UShort => "ushort",
    Int => "int",
    UInt => "uint",
    Long => "long",
    ULong => "ulong",
    Cent => "cent",
    UCent => "ucent",
    Float => "float",
    Double => "double",
    Char => "char",
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A leaf value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Cent(i128),
    UCent(u128),
    Float(f32),
    Double(f64),
    Char(char),
}

impl Scalar {
    /// Returns the kind of this scalar.
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Byte(_) => ScalarKind::Byte,
            Scalar::UByte(_) => ScalarKind::UByte,
            Scalar::Short(_) => ScalarKind::Short,
            Scalar::UShort(_) => ScalarKind::UShort,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::UInt(_) => ScalarKind::UInt,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::ULong(_) => ScalarKind::ULong,
            Scalar::Cent(_) => ScalarKind::Cent,
            Scalar::UCent(_) => ScalarKind::UCent,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Char(_) => ScalarKind::Char,
        }
    }

    /// Parses the textual form written by [`Display`](fmt::Display).
    ///
    /// A `char` must be exactly one character; numbers accept no
    /// surrounding whitespace.
    pub fn parse(kind: ScalarKind, text: &str) -> Option<Scalar> {
        Some(match kind {
            ScalarKind::Bool => Scalar::Bool(text.parse().ok()?),
            ScalarKind::Byte => Scalar::Byte(text.parse().ok()?),
            ScalarKind::UByte => Scalar::UByte(text.parse().ok()?),
            ScalarKind::Short => Scalar::Short(text.parse().ok()?),
            ScalarKind::UShort => Scalar::UShort(text.parse().ok()?),
            ScalarKind::Int => Scalar::Int(text.parse().ok()?),
            ScalarKind::UInt => Scalar::UInt(text.parse().ok()?),
            ScalarKind::Long => Scalar::Long(text.parse().ok()?),
            ScalarKind::ULong => Scalar::ULong(text.parse().ok()?),
            ScalarKind::Cent => Scalar::Cent(text.parse().ok()?),
            ScalarKind::UCent => Scalar::UCent(text.parse().ok()?),
            ScalarKind::Float => Scalar::Float(text.parse().ok()?),
            ScalarKind::Double => Scalar::Double(text.parse().ok()?),
            ScalarKind::Char => {
                let mut chars = text.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Scalar::Char(c)
            }
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => fmt::Display::fmt(v, f),
            Scalar::Byte(v) => fmt::Display::fmt(v, f),
            Scalar::UByte(v) => fmt::Display::fmt(v, f),
            Scalar::Short(v) => fmt::Display::fmt(v, f),
            Scalar::UShort(v) => fmt::Display::fmt(v, f),
            Scalar::Int(v) => fmt::Display::fmt(v, f),
            Scalar::UInt(v) => fmt::Display::fmt(v, f),
            Scalar::Long(v) => fmt::Display::fmt(v, f),
            Scalar::ULong(v) => fmt::Display::fmt(v, f),
            Scalar::Cent(v) => fmt::Display::fmt(v, f),
            Scalar::UCent(v) => fmt::Display::fmt(v, f),
            Scalar::Float(v) => fmt::Display::fmt(v, f),
            Scalar::Double(v) => fmt::Display::fmt(v, f),
            Scalar::Char(v) => fmt::Display::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarValue

/// A Rust primitive that maps onto one [`ScalarKind`].
///
/// Also used as the `#[repr]` of archived enums.
pub trait ScalarValue: Copy + Default + 'static {
    /// The kind this type is archived as.
    const KIND: ScalarKind;

    fn into_scalar(self) -> Scalar;

    /// Returns `None` when the scalar has another kind or is out of range.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! impl_scalar_value {
    ($($ty:ty => $variant:ident,)*) => {$(
        impl ScalarValue for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            #[inline]
            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[inline]
            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

impl_scalar_value! {
    bool => Bool,
    i8 => Byte,
    u8 => UByte,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    i128 => Cent,
    u128 => UCent,
    f32 => Float,
    f64 => Double,
    char => Char,
}

impl ScalarValue for isize {
    const KIND: ScalarKind = ScalarKind::Long;

    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::Long(self as i64)
    }

    #[inline]
    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Long(v) => isize::try_from(v).ok(),
            _ => None,
        }
    }
}

impl ScalarValue for usize {
    const KIND: ScalarKind = ScalarKind::ULong;

    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::ULong(self as u64)
    }

    #[inline]
    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::ULong(v) => usize::try_from(v).ok(),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Array

/// The address range of an archived array.
///
/// Never archived itself. The engine only uses it to find out whether one
/// array lies inside another one, see [`Array::is_slice_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Array {
    /// Address of the first element.
    pub ptr: usize,
    /// Number of elements.
    pub length: usize,
    /// Size in bytes of one element.
    pub element_size: usize,
    /// Type of the elements.
    pub element: TypeId,
}

impl Array {
    /// Describes the storage of `items`.
    #[inline]
    pub fn of<T: 'static>(items: &[T]) -> Self {
        Self {
            ptr: items.as_ptr() as usize,
            length: items.len(),
            element_size: size_of::<T>(),
            element: TypeId::of::<T>(),
        }
    }

    /// One past the last byte.
    #[inline]
    pub const fn end(&self) -> usize {
        self.ptr + self.length * self.element_size
    }

    /// Returns `true` if `self` lies inside `other`.
    ///
    /// Both must hold the same element type. Zero-sized elements and empty
    /// arrays have no meaningful address and never match. Identical ranges
    /// count as contained; callers decide which side is the owner.
    pub fn is_slice_of(&self, other: &Array) -> bool {
        self.element == other.element
            && self.element_size != 0
            && self.length != 0
            && other.length != 0
            && self.ptr >= other.ptr
            && self.end() <= other.end()
    }

    /// Offset of `self` inside `owner`, in elements.
    ///
    /// Only meaningful when `self.is_slice_of(owner)`.
    #[inline]
    pub const fn offset_in(&self, owner: &Array) -> usize {
        (self.ptr - owner.ptr) / self.element_size
    }
}

// -----------------------------------------------------------------------------
// Slice

/// An array archived as a sub-range of another array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// Number of elements.
    pub length: usize,
    /// First element, counted from the start of the owner.
    pub offset: usize,
    /// The id of the owning array.
    pub id: Option<Id>,
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for &kind in ScalarKind::ALL {
            assert_eq!(ScalarKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ScalarKind::from_name("object"), None);
    }

    #[test]
    fn scalar_text() {
        let cases = [
            Scalar::Bool(true),
            Scalar::Int(-382),
            Scalar::ULong(u64::MAX),
            Scalar::Cent(i128::MIN),
            Scalar::Double(0.1),
            Scalar::Float(-2.5),
            Scalar::Char('ß'),
        ];
        for scalar in cases {
            let text = scalar.to_string();
            assert_eq!(Scalar::parse(scalar.kind(), &text), Some(scalar));
        }
        assert_eq!(Scalar::parse(ScalarKind::Int, " 1"), None);
        assert_eq!(Scalar::parse(ScalarKind::Char, "ab"), None);
        assert_eq!(Scalar::parse(ScalarKind::Char, ""), None);
    }

    #[test]
    fn pointer_sized_scalars() {
        assert_eq!(usize::from_scalar(Scalar::ULong(7)), Some(7));
        assert_eq!(isize::from_scalar(Scalar::Int(7)), None);
        assert_eq!(42_usize.into_scalar(), Scalar::ULong(42));
    }

    #[test]
    fn slice_containment() {
        let data = vec![1_i32, 2, 3, 4, 5, 6, 7, 8];
        let whole = Array::of(&data[..]);
        let middle = Array::of(&data[3..7]);

        assert!(middle.is_slice_of(&whole));
        assert!(!whole.is_slice_of(&middle));
        assert!(whole.is_slice_of(&whole));
        assert_eq!(middle.offset_in(&whole), 3);

        let empty = Array::of(&data[2..2]);
        assert!(!empty.is_slice_of(&whole));

        let other = vec![1_u32, 2, 3];
        assert!(!Array::of(&other[..]).is_slice_of(&whole));
    }

    #[test]
    fn zero_sized_elements_never_match() {
        let units = [(); 4];
        let whole = Array::of(&units[..]);
        assert!(!Array::of(&units[1..2]).is_slice_of(&whole));
    }
}
