//! Deserialization: from an [`Unarchiver`](crate::Unarchiver) back to a
//! value graph.
//!
//! [`Deserializer`] keeps one table per kind of identity, keyed by the id
//! of the archived node:
//!
//! - objects, with one handle per static type they were requested as;
//! - [`Shared`](crate::Shared) cells and pointer targets;
//! - array buffers, which `slice` nodes are resolved against.
//!
//! A reference whose target was not read yet is resolved on the spot by
//! jumping to the target node by id.

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod deserializer;
mod identity;
mod session;

// -----------------------------------------------------------------------------
// Exports

pub use deserializer::Deserializer;
