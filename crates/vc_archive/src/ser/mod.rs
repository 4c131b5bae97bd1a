//! Serialization: from a value graph to an [`Archiver`](crate::Archiver)
//! operation stream.
//!
//! [`Serializer`] assigns every node an id in traversal order and tracks
//! three kinds of identity:
//!
//! - objects, pointer targets and maps, whose later occurrences become
//!   `reference` nodes;
//! - [`Shared`](crate::Shared) cells written as values ([`ValueMeta`]),
//!   which later pointers refer to;
//! - array address ranges, turned into `slice` nodes once the root value
//!   was written.

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod identity;
mod post_process;
mod serializer;
mod session;

// -----------------------------------------------------------------------------
// Exports

pub use serializer::Serializer;
pub use session::ValueMeta;
