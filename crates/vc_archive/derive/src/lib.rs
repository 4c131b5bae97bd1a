//! See [`Archive`](derive_archive).
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static ARCHIVE_ATTRIBUTE_NAME: &str = "archive";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Archive Derivation
///
/// The generated code depends on the shape of the type:
///
/// - Structs with named fields, tuple structs with several fields and unit
///   structs implement `Describe`, `Archive`, `Object` and `ObjectType`.
///   They are archived as `struct` nodes by value, and as `object` nodes
///   behind an `Obj` handle. The type must implement `Default`.
/// - Tuple structs with a single field are distinct types wrapping a value
///   and are archived as `typedef` nodes.
/// - Enums without fields are archived as `enum` nodes holding their
///   discriminant, typed after the `#[repr]` (`i32` by default).
///
/// Enums with fields are rejected.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Archive, Default)]
/// #[archive(rename = "shapes.Circle")]
/// struct Circle { radius: f64 }
/// ```
///
/// - `rename = "..."`: the type name written into the archive and looked up
///   in the registry. Defaults to the module path followed by the type name.
/// - `custom`: archive the members with the type's `CustomArchive` impl
///   instead of walking the fields.
/// - `on_serializing = path`, `on_serialized = path`: functions taking
///   `&Self`, run before and after the members are written.
/// - `on_deserializing = path`, `on_deserialized = path`: functions taking
///   `&mut Self`, run before and after the members are read.
/// - `crate = "..."`: the path of the `vc_archive` crate, `::vc_archive`
///   by default.
///
/// ## Field Attributes
///
/// - `skip`: the field is never written and keeps its default when read.
/// - `rename = "..."`: the key the field is archived under.
/// - `base`: the field holds the embedded base type. Its members are
///   archived in a `base` section after the other fields. The field type
///   must implement `Describe`. At most one field may be marked.
#[proc_macro_derive(Archive, attributes(archive))]
pub fn derive_archive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::match_archive_impls(ast)
}
