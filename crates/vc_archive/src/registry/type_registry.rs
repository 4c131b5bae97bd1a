use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use core::fmt;

use crate::de::Deserializer;
use crate::describe::Describe;
use crate::hash::{FixedHashState, HashMap, TypeIdMap};
use crate::registry::TypeEntry;
use crate::ser::Serializer;
use crate::{Error, Obj, ObjectType};

// -----------------------------------------------------------------------------
// Codec callbacks

/// A type-erased custom serializer.
///
/// Receives the value and writes its members into the scope the engine
/// opened for it.
pub type SerializeFn =
    Arc<dyn Fn(&dyn Any, &mut Serializer<'_>) -> Result<(), Error> + Send + Sync>;

/// A type-erased custom deserializer.
///
/// Receives a default instance and populates it from the current scope.
pub type DeserializeFn =
    Arc<dyn Fn(&mut dyn Any, &mut Deserializer<'_>) -> Result<(), Error> + Send + Sync>;

#[inline]
fn constrain_ser<F>(f: F) -> F
where
    F: Fn(&dyn Any, &mut Serializer<'_>) -> Result<(), Error>,
{
    f
}

#[inline]
fn constrain_de<F>(f: F) -> F
where
    F: Fn(&mut dyn Any, &mut Deserializer<'_>) -> Result<(), Error>,
{
    f
}

/// Erases a typed serializer into a [`SerializeFn`].
pub fn erase_serializer<T, F>(f: F) -> SerializeFn
where
    T: Any,
    F: Fn(&T, &mut Serializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
{
    Arc::new(constrain_ser(move |value, s| match value.downcast_ref::<T>() {
        Some(value) => f(value, s),
        None => Err(Error::type_mismatch(type_name::<T>(), "another type")),
    }))
}

/// Erases a typed deserializer into a [`DeserializeFn`].
pub fn erase_deserializer<T, F>(f: F) -> DeserializeFn
where
    T: Any,
    F: Fn(&mut T, &mut Deserializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
{
    Arc::new(constrain_de(move |value, d| match value.downcast_mut::<T>() {
        Some(value) => f(value, d),
        None => Err(Error::type_mismatch(type_name::<T>(), "another type")),
    }))
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// The registry of object types and custom codecs.
///
/// It is owned by the caller and lent to each
/// [`Serializer`] and [`Deserializer`]; nothing is global, so independent
/// sessions can run on different threads with their own registries, or
/// share one through [`TypeRegistryArc`](super::TypeRegistryArc).
///
/// The registry answers two questions:
///
/// - Given a runtime type name, how to walk, allocate and populate an
///   object of that type, and how to view it through a base trait.
///   See [`register`](Self::register) and [`register_base`](Self::register_base).
/// - Whether a type has a custom serializer or deserializer.
///   See [`register_serializer`](Self::register_serializer).
///
/// # Example
///
/// ```
/// use vc_archive::{Archive, Object, ObjectType};
/// use vc_archive::registry::TypeRegistry;
///
/// trait Shape: Object {}
/// impl ObjectType for dyn Shape {}
///
/// #[derive(Archive, Default)]
/// #[archive(rename = "Circle")]
/// struct Circle {
///     radius: f64,
/// }
///
/// impl Shape for Circle {}
///
/// let mut registry = TypeRegistry::new();
/// vc_archive::register_polymorphic!(registry, Circle => dyn Shape);
///
/// let entry = registry.get_with_name("Circle").unwrap();
/// assert!(entry.has_base::<dyn Shape>());
/// ```
pub struct TypeRegistry {
    entries: TypeIdMap<TypeEntry>,
    names: HashMap<&'static str, TypeId>,
    serializers: TypeIdMap<SerializeFn>,
    deserializers: TypeIdMap<DeserializeFn>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: TypeIdMap::with_hasher(FixedHashState),
            names: HashMap::with_hasher(FixedHashState),
            serializers: TypeIdMap::with_hasher(FixedHashState),
            deserializers: TypeIdMap::with_hasher(FixedHashState),
        }
    }

    /// Registers the object type `C` under its archived name.
    ///
    /// Registering the same type twice keeps the first entry, along with the
    /// bases recorded for it. A different type claiming an already used name
    /// replaces the old name binding.
    pub fn register<C: Describe>(&mut self) -> &mut Self {
        let type_id = TypeId::of::<C>();
        if self.entries.contains_key(&type_id) {
            return self;
        }

        let entry = TypeEntry::of::<C>();
        let name = entry.type_name();
        if let Some(previous) = self.names.insert(name, type_id) {
            log::warn!(
                "type name `{name}` was registered for another type {previous:?}, replacing it"
            );
        }
        self.entries.insert(type_id, entry);
        self
    }

    /// Records that an `Obj<C>` can be viewed as an `Obj<B>`.
    ///
    /// `upcast` is the unsizing coercion, usually written `|rc| rc`; see
    /// [`register_polymorphic!`](crate::register_polymorphic). Registers
    /// `C` first if needed.
    pub fn register_base<C, B>(&mut self, upcast: fn(Rc<RefCell<C>>) -> Rc<RefCell<B>>) -> &mut Self
    where
        C: Describe,
        B: ?Sized + ObjectType,
    {
        self.register::<C>();
        let erased: Box<dyn Fn(&dyn Any) -> Option<Box<dyn Any>> + Send + Sync> =
            Box::new(move |handle: &dyn Any| {
                let obj = handle.downcast_ref::<Obj<C>>()?;
                let base: Box<dyn Any> = Box::new(Obj::from_rc(upcast(obj.as_rc().clone())));
                Some(base)
            });
        if let Some(entry) = self.entries.get_mut(&TypeId::of::<C>()) {
            entry.insert_upcast(TypeId::of::<Obj<B>>(), erased);
        }
        self
    }

    /// Installs a custom serializer for `T`, used instead of its own codec.
    pub fn register_serializer<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &mut Serializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.serializers
            .insert(TypeId::of::<T>(), erase_serializer::<T, F>(f));
        self
    }

    /// Installs a custom deserializer for `T`, used instead of its own codec.
    pub fn register_deserializer<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any,
        F: Fn(&mut T, &mut Deserializer<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.deserializers
            .insert(TypeId::of::<T>(), erase_deserializer::<T, F>(f));
        self
    }

    /// Returns `true` if the object type `T` was registered.
    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(&type_id)
    }

    /// Looks an object type up by its runtime name.
    #[inline]
    pub fn get_with_name(&self, name: &str) -> Option<&TypeEntry> {
        self.names.get(name).and_then(|id| self.entries.get(id))
    }

    #[inline]
    pub fn serializer(&self, type_id: TypeId) -> Option<&SerializeFn> {
        self.serializers.get(&type_id)
    }

    #[inline]
    pub fn deserializer(&self, type_id: TypeId) -> Option<&DeserializeFn> {
        self.deserializers.get(&type_id)
    }

    /// Number of registered object types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered object types.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names.keys())
            .field("serializers", &self.serializers.len())
            .field("deserializers", &self.deserializers.len())
            .finish()
    }
}

/// Registers a concrete object type together with the trait objects it can
/// be archived through.
///
/// ```ignore
/// register_polymorphic!(registry, Circle => dyn Shape, dyn Named);
/// ```
#[macro_export]
macro_rules! register_polymorphic {
    ($registry:expr, $concrete:ty => $($base:ty),+ $(,)?) => {{
        let registry: &mut $crate::registry::TypeRegistry = &mut $registry;
        registry.register::<$concrete>();
        $(
            registry.register_base::<$concrete, $base>(|rc| rc);
        )+
    }};
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::TypeRegistry;
    use crate::{Archive, Object, ObjectType};

    trait Named: Object {
        fn name(&self) -> String;
    }

    impl ObjectType for dyn Named {}

    #[derive(Archive, Default)]
    #[archive(rename = "animals.Dog")]
    struct Dog {
        name: String,
    }

    impl Named for Dog {
        fn name(&self) -> String {
            self.name.clone()
        }
    }

    #[derive(Archive, Default)]
    #[archive(rename = "animals.Cat")]
    struct Cat {
        lives: u8,
    }

    #[test]
    fn register_by_name() {
        let mut registry = TypeRegistry::new();
        registry.register::<Dog>().register::<Cat>().register::<Dog>();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains::<Dog>());
        assert_eq!(
            registry.get_with_name("animals.Dog").unwrap().type_name(),
            "animals.Dog"
        );
        assert!(registry.get_with_name("Dog").is_none());
        assert!(registry.get_with_name("animals.Cat").is_some());
        assert!(registry.get_with_name("Cow").is_none());
    }

    #[test]
    fn upcast_views_share_the_object() {
        let mut registry = TypeRegistry::new();
        crate::register_polymorphic!(registry, Dog => dyn Named);

        let entry = registry.get_with_name("animals.Dog").unwrap();
        let handle = entry.allocate();
        let dog = entry.upcast::<Dog>(&*handle).unwrap();
        dog.borrow_mut().name = "Rex".into();

        let named = entry.upcast::<dyn Named>(&*handle).unwrap();
        assert_eq!(named.borrow().name(), "Rex");
        assert!(named.ptr_eq(&dog));

        let cat = registry.get_with_name("animals.Cat");
        assert!(cat.is_none());
    }

    #[test]
    fn custom_codecs_are_keyed_by_type() {
        let mut registry = TypeRegistry::new();
        registry.register_serializer::<Cat, _>(|cat, s| s.write_scalar(cat.lives, "lives"));
        registry.register_deserializer::<Cat, _>(|cat, d| {
            cat.lives = d.read_scalar("lives")?;
            Ok(())
        });

        assert!(registry.serializer(core::any::TypeId::of::<Cat>()).is_some());
        assert!(registry.deserializer(core::any::TypeId::of::<Cat>()).is_some());
        assert!(registry.serializer(core::any::TypeId::of::<Dog>()).is_none());
    }
}
