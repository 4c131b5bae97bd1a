//! Paths into the `vc_archive` crate used by the generated code.
//!
//! Everything goes through the crate path given by the user, so the
//! generated code keeps working when `vc_archive` is re-exported.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

// -----------------------------------------------------------------------------
// Crate Path

/// The path of the `vc_archive` crate: `#[archive(crate = "...")]` if
/// given, `::vc_archive` otherwise.
pub(crate) fn vc_archive(custom: Option<&Path>) -> Path {
    match custom {
        Some(path) => path.clone(),
        None => syn::parse_quote!(::vc_archive),
    }
}

// -----------------------------------------------------------------------------
// Internal API

#[inline(always)]
pub(crate) fn archive_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Archive
    }
}

#[inline(always)]
pub(crate) fn object_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Object
    }
}

#[inline(always)]
pub(crate) fn object_type_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::ObjectType
    }
}

#[inline(always)]
pub(crate) fn obj_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Obj
    }
}

#[inline(always)]
pub(crate) fn error_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Error
    }
}

#[inline(always)]
pub(crate) fn serializer_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Serializer
    }
}

#[inline(always)]
pub(crate) fn deserializer_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::Deserializer
    }
}

#[inline(always)]
pub(crate) fn describe_(vc_archive_path: &Path) -> TokenStream {
    quote! {
        #vc_archive_path::describe
    }
}
