//! A format-agnostic object-graph serialization engine.
//!
//! A [`Serializer`] decomposes a value graph into a stream of archive
//! operations that an [`Archiver`] backend turns into bytes. A
//! [`Deserializer`] drives an [`Unarchiver`] to rebuild an equivalent
//! graph, preserving:
//!
//! - object identity: every path to an [`Obj`] yields the same instance;
//! - cycles, which are re-linked instead of unrolled;
//! - pointer topology between [`Ptr`]s and the [`Shared`] cells they
//!   point at;
//! - slices: a [`SharedSlice`] that views part of another one still does
//!   after the round trip.
//!
//! Types opt in through [`Archive`], usually derived. Polymorphic objects
//! and custom codecs are looked up in an explicitly owned [`TypeRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use vc_archive::{Archive, Obj, Serializer, TypeRegistry};
//!
//! #[derive(Archive, Default)]
//! struct Node {
//!     value: i32,
//!     next: Option<Obj<Node>>,
//! }
//!
//! let registry = TypeRegistry::new();
//! let mut archiver = vc_xml::XmlArchiver::new();
//! let root = Obj::new(Node::default());
//! let bytes = Serializer::new(&mut archiver, &registry).serialize(&root, "")?;
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// The derive emits `::vc_archive` paths, which must also resolve inside
// this crate's own tests.
extern crate self as vc_archive;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod impls;
mod traits;

pub mod archiver;
pub mod de;
pub mod describe;
pub mod error;
pub mod handle;
pub mod hash;
pub mod registry;
pub mod ser;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use vc_archive_derive as derive;
pub use vc_archive_derive::Archive;

pub use archiver::{Archiver, Unarchiver};
pub use de::Deserializer;
pub use describe::{CustomArchive, Describe};
pub use error::{Error, ErrorAction, ErrorCallback, ErrorKind, raise, warn_and_ignore};
pub use handle::{Obj, OpaquePtr, Ptr, Shared, SharedSlice};
pub use registry::TypeRegistry;
pub use ser::Serializer;
pub use traits::{Archive, Object, ObjectType};
