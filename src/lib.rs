//! Object-graph serialization.
//!
//! [`archive`] holds the format-agnostic engine: the value model, the
//! archiver contract, the serializer, the deserializer and the type
//! registry. [`xml`] is the reference backend.
//!
//! ```ignore
//! use vc_serial::prelude::*;
//!
//! #[derive(Archive, Default)]
//! struct Node {
//!     value: i32,
//!     next: Option<Obj<Node>>,
//! }
//!
//! let registry = TypeRegistry::new();
//! let xml = vc_serial::xml::to_xml(&Obj::new(Node::default()), &registry)?;
//! let node: Obj<Node> = vc_serial::xml::from_xml(&xml, &registry)?;
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_archive as archive;

#[cfg(feature = "xml")]
#[cfg_attr(docsrs, doc(cfg(feature = "xml")))]
pub use vc_xml as xml;

/// The items most programs need.
pub mod prelude {
    pub use vc_archive::{
        Archive, CustomArchive, Deserializer, Error, ErrorAction, Obj, Object, ObjectType,
        OpaquePtr, Ptr, Serializer, Shared, SharedSlice, TypeRegistry, register_polymorphic,
    };

    #[cfg(feature = "xml")]
    pub use vc_xml::{XmlArchiver, XmlUnarchiver};
}
