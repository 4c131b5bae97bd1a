use core::any::{Any, type_name};

use crate::Error;
use crate::de::Deserializer;
use crate::handle::Obj;
use crate::ser::Serializer;

// -----------------------------------------------------------------------------
// Archive

/// A type that can be written by a [`Serializer`] and read back by a
/// [`Deserializer`].
///
/// Implemented for primitives, strings, containers and the handle types of
/// this crate. User types usually get it from
/// [`#[derive(Archive)]`](crate::derive::Archive).
///
/// # Example
///
/// A manual implementation that archives a unit-like marker as a `bool`.
///
/// ```
/// use vc_archive::{Archive, Error};
/// use vc_archive::de::Deserializer;
/// use vc_archive::ser::Serializer;
///
/// struct Flag(bool);
///
/// impl Archive for Flag {
///     fn type_name() -> &'static str {
///         "Flag"
///     }
///
///     fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error> {
///         s.write_scalar(self.0, key)
///     }
///
///     fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error> {
///         d.read_scalar(key).map(Flag)
///     }
/// }
/// ```
pub trait Archive: Sized + 'static {
    /// The name written in `type` attributes.
    ///
    /// Defaults to [`core::any::type_name`].
    #[inline]
    fn type_name() -> &'static str {
        type_name::<Self>()
    }

    /// Emits `self` under `key` in the current scope.
    fn serialize(&self, s: &mut Serializer<'_>, key: &str) -> Result<(), Error>;

    /// Reads the node stored under `key` in the current scope.
    fn deserialize(d: &mut Deserializer<'_>, key: &str) -> Result<Self, Error>;

    /// The value substituted when an ignored error made reading fail.
    ///
    /// `None` lets the failure reach the enclosing value.
    #[inline]
    fn fallback() -> Option<Self> {
        None
    }
}

// -----------------------------------------------------------------------------
// Object

/// The dynamic half of an object type, usable through `dyn Trait`.
///
/// Polymorphic traits take it as a supertrait:
///
/// ```
/// use vc_archive::{Object, ObjectType};
///
/// trait Shape: Object {
///     fn area(&self) -> f64;
/// }
///
/// impl ObjectType for dyn Shape {}
/// ```
pub trait Object: Any {
    /// The registered name of the concrete type.
    fn runtime_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The static half of an object type: what an [`Obj<Self>`] handle needs.
///
/// Concrete types get every method from the derive. For a trait object
/// `dyn Trait` the defaults are right: such handles resolve their runtime
/// type through the [`TypeRegistry`](crate::registry::TypeRegistry).
pub trait ObjectType: Object {
    /// The name written in the `type` attribute of `object` nodes.
    #[inline]
    fn static_type_name() -> &'static str {
        type_name::<Self>()
    }

    /// Creates a default instance to be populated, `None` when the type
    /// cannot be instantiated directly.
    #[inline]
    fn allocate() -> Option<Obj<Self>> {
        None
    }

    /// Writes the members of `this`, `None` when only the registry knows how.
    #[inline]
    fn serialize_static(this: &Self, s: &mut Serializer<'_>) -> Option<Result<(), Error>> {
        let _ = (this, s);
        None
    }

    /// Reads the members of `this`, `None` when only the registry knows how.
    #[inline]
    fn populate_static(this: &mut Self, d: &mut Deserializer<'_>) -> Option<Result<(), Error>> {
        let _ = (this, d);
        None
    }
}
