//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod archive_derive;
mod archive_enum;
mod archive_meta;
mod archive_struct;
mod attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};

pub(crate) use archive_derive::ArchiveDerive;
pub(crate) use archive_enum::ArchiveEnum;
pub(crate) use archive_meta::ArchiveMeta;
pub(crate) use archive_struct::{ArchiveStruct, StructField};
