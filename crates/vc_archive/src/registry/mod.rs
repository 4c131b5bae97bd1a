//! The [`TypeRegistry`]: runtime type names, polymorphic upcasts and
//! custom codecs.

// -----------------------------------------------------------------------------
// Modules

mod type_entry;
mod type_registry;

#[cfg(feature = "std")]
mod registry_arc;

// -----------------------------------------------------------------------------
// Exports

pub use type_entry::TypeEntry;
pub use type_registry::{
    DeserializeFn, SerializeFn, TypeRegistry, erase_deserializer, erase_serializer,
};

#[cfg(feature = "std")]
pub use registry_arc::TypeRegistryArc;
