//! The backend contract.
//!
//! A [`Serializer`](crate::ser::Serializer) drives an [`Archiver`] with a
//! stream of begin/end and leaf calls. A
//! [`Deserializer`](crate::de::Deserializer) reads the same structure back
//! through an [`Unarchiver`], by key within the current scope or by id
//! anywhere in the archive.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::Error;
use crate::value::{Array, Id, Scalar, ScalarKind, Slice};

// -----------------------------------------------------------------------------
// Archiver

/// Turns the engine's operation stream into an encoding.
///
/// Every `begin_*` is matched by the corresponding `end_*` right after the
/// children of the composite were emitted. Keys are unique within their
/// parent scope only; ids are unique within a session.
///
/// Implementations report problems through `Err` and never panic.
pub trait Archiver {
    /// Starts a new session, discarding anything emitted before.
    fn begin_archiving(&mut self) -> Result<(), Error>;

    /// Drops all state so the archiver can be reused.
    fn reset(&mut self);

    /// Finishes the session and returns the encoded bytes.
    fn flush(&mut self) -> Result<Vec<u8>, Error>;

    /// Number of composites currently open.
    fn depth(&self) -> usize;

    /// Closes composites until only `depth` remain open.
    ///
    /// Used to resume after an ignored error left a scope half written.
    fn restore(&mut self, depth: usize);

    fn begin_object(
        &mut self,
        runtime_type: &str,
        static_type: &str,
        key: &str,
        id: Id,
    ) -> Result<(), Error>;
    fn end_object(&mut self) -> Result<(), Error>;

    fn begin_struct(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error>;
    fn end_struct(&mut self) -> Result<(), Error>;

    /// Opens an array. `array` carries the length; elements follow keyed
    /// by their decimal index.
    fn begin_array(
        &mut self,
        array: &Array,
        element_type: &str,
        key: &str,
        id: Id,
    ) -> Result<(), Error>;
    fn end_array(&mut self) -> Result<(), Error>;

    /// Writes a string, the character-array specialization of an array.
    fn archive_string(&mut self, array: &Array, value: &str, key: &str, id: Id)
    -> Result<(), Error>;

    fn begin_associative_array(
        &mut self,
        key_type: &str,
        value_type: &str,
        length: usize,
        key: &str,
        id: Id,
    ) -> Result<(), Error>;
    fn end_associative_array(&mut self) -> Result<(), Error>;

    /// Opens the key half of entry `index`.
    fn begin_entry_key(&mut self, index: &str) -> Result<(), Error>;
    fn end_entry_key(&mut self) -> Result<(), Error>;
    /// Opens the value half of entry `index`.
    fn begin_entry_value(&mut self, index: &str) -> Result<(), Error>;
    fn end_entry_value(&mut self) -> Result<(), Error>;

    fn begin_pointer(&mut self, key: &str, id: Id) -> Result<(), Error>;
    fn end_pointer(&mut self) -> Result<(), Error>;

    /// Opens the section holding the fields of a base type.
    fn begin_base(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error>;
    fn end_base(&mut self) -> Result<(), Error>;

    fn begin_typedef(&mut self, ty: &str, key: &str, id: Id) -> Result<(), Error>;
    fn end_typedef(&mut self) -> Result<(), Error>;

    fn archive_scalar(&mut self, value: Scalar, key: &str, id: Id) -> Result<(), Error>;

    /// Writes an enum as its underlying scalar, tagged with the enum type.
    fn archive_enum(&mut self, base: Scalar, ty: &str, key: &str, id: Id) -> Result<(), Error>;

    fn archive_null(&mut self, ty: &str, key: &str) -> Result<(), Error>;

    /// Writes a non-owning link to the node carrying `id`.
    fn archive_reference(&mut self, key: &str, id: Id) -> Result<(), Error>;

    /// Rewrites the array `slice_id` as a sub-range of the array `array_id`.
    ///
    /// Only called while post-processing, after the root value was emitted.
    fn archive_slice(&mut self, slice: Slice, slice_id: Id, array_id: Id) -> Result<(), Error>;

    /// Called during post-processing for every array that is nobody's slice.
    fn post_process_array(&mut self, id: Id) -> Result<(), Error>;
}

// -----------------------------------------------------------------------------
// NodeKind

/// The kind of an archived node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Struct,
    Array,
    String,
    AssociativeArray,
    Pointer,
    Base,
    Typedef,
    Enum,
    Null,
    Reference,
    Slice,
    Scalar(ScalarKind),
}

impl NodeKind {
    /// The wire name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Struct => "struct",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::AssociativeArray => "associativeArray",
            NodeKind::Pointer => "pointer",
            NodeKind::Base => "base",
            NodeKind::Typedef => "typedef",
            NodeKind::Enum => "enum",
            NodeKind::Null => "null",
            NodeKind::Reference => "reference",
            NodeKind::Slice => "slice",
            NodeKind::Scalar(kind) => kind.name(),
        }
    }

    /// Resolves a wire name. Entry wrappers (`key`/`value`) are not nodes.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "object" => NodeKind::Object,
            "struct" => NodeKind::Struct,
            "array" => NodeKind::Array,
            "string" => NodeKind::String,
            "associativeArray" => NodeKind::AssociativeArray,
            "pointer" => NodeKind::Pointer,
            "base" => NodeKind::Base,
            "typedef" => NodeKind::Typedef,
            "enum" => NodeKind::Enum,
            "null" => NodeKind::Null,
            "reference" => NodeKind::Reference,
            "slice" => NodeKind::Slice,
            other => NodeKind::Scalar(ScalarKind::from_name(other)?),
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Headers

/// What a reader learns about a node before deciding how to decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    pub kind: NodeKind,
    /// `None` for the non-owning leaves: `null`, `reference` and `slice`.
    pub id: Option<Id>,
}

/// Attributes of an opened `object` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    pub runtime_type: String,
    pub static_type: String,
    pub id: Id,
}

/// Attributes of an opened array or associative array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayHeader {
    pub length: usize,
    pub id: Id,
}

// -----------------------------------------------------------------------------
// Unarchiver

/// Reads an encoding back, mirroring [`Archiver`].
///
/// Lookups are keyed, not positional: any child of the current scope can be
/// read in any order, and [`enter_by_id`](Unarchiver::enter_by_id) reaches
/// a node anywhere in the archive.
pub trait Unarchiver {
    /// Parses `data` and positions the reader at the top-level scope.
    fn begin_unarchiving(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Drops all state so the unarchiver can be reused.
    fn reset(&mut self);

    /// Number of composites currently open.
    fn depth(&self) -> usize;

    /// Leaves composites until only `depth` remain open.
    fn restore(&mut self, depth: usize);

    /// Describes the child `key` of the current scope.
    fn node(&self, key: &str) -> Result<NodeHeader, Error>;

    /// The key of the only child of the current scope.
    ///
    /// Pointers and typedefs hold a single child under a generated key.
    fn sole_child_key(&self) -> Result<String, Error>;

    /// Makes the parent of the node carrying `id` the current scope and
    /// returns the node's key. Undone by [`leave`](Unarchiver::leave).
    fn enter_by_id(&mut self, id: Id) -> Result<String, Error>;

    /// Returns to the scope that was current before the last
    /// [`enter_by_id`](Unarchiver::enter_by_id).
    fn leave(&mut self) -> Result<(), Error>;

    fn begin_object(&mut self, key: &str) -> Result<ObjectHeader, Error>;
    fn end_object(&mut self) -> Result<(), Error>;

    fn begin_struct(&mut self, key: &str) -> Result<Id, Error>;
    fn end_struct(&mut self) -> Result<(), Error>;

    fn begin_array(&mut self, key: &str) -> Result<ArrayHeader, Error>;
    fn end_array(&mut self) -> Result<(), Error>;

    fn unarchive_string(&mut self, key: &str) -> Result<(String, Id), Error>;

    fn begin_associative_array(&mut self, key: &str) -> Result<ArrayHeader, Error>;
    fn end_associative_array(&mut self) -> Result<(), Error>;

    fn begin_entry_key(&mut self, index: &str) -> Result<(), Error>;
    fn end_entry_key(&mut self) -> Result<(), Error>;
    fn begin_entry_value(&mut self, index: &str) -> Result<(), Error>;
    fn end_entry_value(&mut self) -> Result<(), Error>;

    fn begin_pointer(&mut self, key: &str) -> Result<Id, Error>;
    fn end_pointer(&mut self) -> Result<(), Error>;

    fn begin_base(&mut self, key: &str) -> Result<Id, Error>;
    fn end_base(&mut self) -> Result<(), Error>;

    fn begin_typedef(&mut self, key: &str) -> Result<Id, Error>;
    fn end_typedef(&mut self) -> Result<(), Error>;

    fn unarchive_scalar(&mut self, kind: ScalarKind, key: &str) -> Result<Scalar, Error>;

    /// Reads an enum's underlying scalar.
    fn unarchive_enum(&mut self, kind: ScalarKind, key: &str) -> Result<Scalar, Error>;

    /// Reads the id a `reference` node points at.
    fn unarchive_reference(&mut self, key: &str) -> Result<Id, Error>;

    fn unarchive_slice(&mut self, key: &str) -> Result<Slice, Error>;
}

#[cfg(test)]
mod tests {
    use super::NodeKind;
    use crate::value::ScalarKind;

    #[test]
    fn node_names() {
        for kind in [
            NodeKind::Object,
            NodeKind::AssociativeArray,
            NodeKind::Slice,
            NodeKind::Scalar(ScalarKind::UCent),
        ] {
            assert_eq!(NodeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("key"), None);
    }
}
