//! Field-descriptor tables.
//!
//! A [`Descriptor`] lists the members of a type together with the functions
//! that write and read each of them. The engine walks these tables instead
//! of discovering fields at runtime; they are generated by
//! [`#[derive(Archive)]`](crate::derive::Archive) and built once per type as
//! a constant.

use crate::de::Deserializer;
use crate::ser::Serializer;
use crate::{Archive, Error};

// -----------------------------------------------------------------------------
// Describe

/// A type with a field-descriptor table.
///
/// Structs described this way are archived as `struct` nodes, or as
/// `object` nodes behind an [`Obj`](crate::Obj). Reading one starts from
/// `Default::default()`, so excluded fields keep their default value.
pub trait Describe: Archive + Default {
    const DESCRIPTOR: &'static Descriptor<Self>;
}

/// The description of a type's members.
pub struct Descriptor<T: 'static> {
    /// Fields in declaration order, excluded ones included.
    pub fields: &'static [FieldInfo<T>],
    /// The embedded base type, archived as a `base` section after the fields.
    pub base: Option<BaseField<T>>,
    pub hooks: Hooks<T>,
    /// Replaces the field walk entirely when present.
    pub custom: Option<CustomCodec<T>>,
}

impl<T: 'static> Descriptor<T> {
    /// Looks a field up by its archived name.
    pub fn field(&self, name: &str) -> Option<&FieldInfo<T>> {
        self.fields.iter().find(|field| field.name == name)
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Writes one member of `T` under the given key.
pub type FieldSerializeFn<T> = fn(&T, &mut Serializer<'_>, &str) -> Result<(), Error>;

/// Reads one member of `T` from the given key.
pub type FieldDeserializeFn<T> = fn(&mut T, &mut Deserializer<'_>, &str) -> Result<(), Error>;

/// One named member.
pub struct FieldInfo<T> {
    /// The key the field is archived under.
    pub name: &'static str,
    /// Excluded fields are never written and keep their default when read.
    pub skip: bool,
    pub serialize: FieldSerializeFn<T>,
    pub deserialize: FieldDeserializeFn<T>,
}

impl<T> FieldInfo<T> {
    /// A field that is never archived.
    pub const fn skipped(name: &'static str) -> Self {
        Self {
            name,
            skip: true,
            serialize: write_nothing::<T>,
            deserialize: read_nothing::<T>,
        }
    }
}

fn write_nothing<T>(_: &T, _: &mut Serializer<'_>, _: &str) -> Result<(), Error> {
    Ok(())
}

fn read_nothing<T>(_: &mut T, _: &mut Deserializer<'_>, _: &str) -> Result<(), Error> {
    Ok(())
}

// -----------------------------------------------------------------------------
// BaseField

/// An embedded base type whose members form a `base` section.
pub struct BaseField<T> {
    /// The key of the `base` section.
    pub name: &'static str,
    pub type_name: fn() -> &'static str,
    pub serialize: fn(&T, &mut Serializer<'_>) -> Result<(), Error>,
    pub deserialize: fn(&mut T, &mut Deserializer<'_>) -> Result<(), Error>,
}

// -----------------------------------------------------------------------------
// Hooks

/// Lifecycle callbacks run around writing and reading the members.
pub struct Hooks<T> {
    pub on_serializing: Option<fn(&T)>,
    pub on_serialized: Option<fn(&T)>,
    pub on_deserializing: Option<fn(&mut T)>,
    pub on_deserialized: Option<fn(&mut T)>,
}

impl<T> Hooks<T> {
    pub const NONE: Self = Self {
        on_serializing: None,
        on_serialized: None,
        on_deserializing: None,
        on_deserialized: None,
    };
}

// -----------------------------------------------------------------------------
// Custom codecs

/// A type that archives its own members.
///
/// Enabled with `#[archive(custom)]`. The codec writes children into the
/// scope the engine opened for the value, and may recurse into the engine
/// with [`Serializer::write`] and [`Deserializer::read`].
pub trait CustomArchive {
    fn to_archive(&self, s: &mut Serializer<'_>) -> Result<(), Error>;

    fn from_archive(&mut self, d: &mut Deserializer<'_>) -> Result<(), Error>;
}

/// The [`CustomArchive`] functions of `T`, as stored in its descriptor.
pub struct CustomCodec<T> {
    pub to_archive: fn(&T, &mut Serializer<'_>) -> Result<(), Error>,
    pub from_archive: fn(&mut T, &mut Deserializer<'_>) -> Result<(), Error>,
}

impl<T: CustomArchive> CustomCodec<T> {
    pub const OF: Self = Self {
        to_archive: T::to_archive,
        from_archive: T::from_archive,
    };
}
