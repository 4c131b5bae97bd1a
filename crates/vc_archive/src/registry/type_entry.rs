use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::de::Deserializer;
use crate::describe::Describe;
use crate::hash::{FixedHashState, TypeIdMap};
use crate::ser::Serializer;
use crate::{Error, Obj, ObjectType};

/// Converts a boxed `Obj<C>` into a boxed `Obj<B>` for some base `B`.
pub(crate) type UpcastFn = Box<dyn Fn(&dyn Any) -> Option<Box<dyn Any>> + Send + Sync>;

// -----------------------------------------------------------------------------
// TypeEntry

/// What the registry knows about one concrete object type.
///
/// Created by [`TypeRegistry::register`](super::TypeRegistry::register).
/// All functions work on type-erased values, which is what lets an
/// `Obj<dyn Trait>` be archived and reconstructed through its runtime name.
pub struct TypeEntry {
    type_id: TypeId,
    type_name: &'static str,
    walk: fn(&dyn Any, &mut Serializer<'_>) -> Result<(), Error>,
    populate: fn(&mut dyn Any, &mut Deserializer<'_>) -> Result<(), Error>,
    allocate: fn() -> Box<dyn Any>,
    upcasts: TypeIdMap<UpcastFn>,
}

impl TypeEntry {
    /// Creates the entry of `C`.
    pub fn of<C: Describe>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: C::type_name(),
            walk: walk_erased::<C>,
            populate: populate_erased::<C>,
            allocate: allocate_erased::<C>,
            upcasts: TypeIdMap::with_hasher(FixedHashState),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The runtime name objects of this type are archived with.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Writes the members of `value`, which must be of this type.
    #[inline]
    pub fn walk(&self, value: &dyn Any, s: &mut Serializer<'_>) -> Result<(), Error> {
        (self.walk)(value, s)
    }

    /// Reads the members of `value`, which must be of this type.
    #[inline]
    pub fn populate(&self, value: &mut dyn Any, d: &mut Deserializer<'_>) -> Result<(), Error> {
        (self.populate)(value, d)
    }

    /// A boxed `Obj<C>` holding a default instance.
    #[inline]
    pub fn allocate(&self) -> Box<dyn Any> {
        (self.allocate)()
    }

    /// Views the boxed `Obj<C>` in `handle` as an `Obj<B>`.
    ///
    /// Succeeds for `B = C` and for every base recorded with
    /// [`TypeRegistry::register_base`](super::TypeRegistry::register_base).
    pub fn upcast<B: ?Sized + ObjectType>(&self, handle: &dyn Any) -> Option<Obj<B>> {
        if let Some(obj) = handle.downcast_ref::<Obj<B>>() {
            return Some(obj.clone());
        }
        let upcast = self.upcasts.get(&TypeId::of::<Obj<B>>())?;
        upcast(handle)?.downcast::<Obj<B>>().ok().map(|obj| *obj)
    }

    /// Returns `true` if an `Obj<B>` view can be made from this type.
    #[inline]
    pub fn has_base<B: ?Sized + ObjectType>(&self) -> bool {
        self.upcasts.contains_key(&TypeId::of::<Obj<B>>())
    }

    #[inline]
    pub(crate) fn insert_upcast(&mut self, base: TypeId, upcast: UpcastFn) {
        self.upcasts.insert(base, upcast);
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_name", &self.type_name)
            .field("bases", &self.upcasts.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Erased functions

fn walk_erased<C: Describe>(value: &dyn Any, s: &mut Serializer<'_>) -> Result<(), Error> {
    match value.downcast_ref::<C>() {
        Some(value) => s.write_fields(value),
        None => Err(Error::type_mismatch(C::type_name(), "another type")),
    }
}

fn populate_erased<C: Describe>(
    value: &mut dyn Any,
    d: &mut Deserializer<'_>,
) -> Result<(), Error> {
    match value.downcast_mut::<C>() {
        Some(value) => d.populate(value),
        None => Err(Error::type_mismatch(C::type_name(), "another type")),
    }
}

fn allocate_erased<C: Describe>() -> Box<dyn Any> {
    Box::new(Obj::new(C::default()))
}
