use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::ArchiveDerive;

/// Provided for `#[derive(Archive)]`.
pub(crate) fn match_archive_impls(ast: DeriveInput) -> TokenStream {
    let archive_derive = match ArchiveDerive::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let archive_impls: proc_macro2::TokenStream = match archive_derive {
        ArchiveDerive::Struct(info) => super::impl_struct(&info),
        ArchiveDerive::Typedef(info) => super::impl_typedef(&info),
        ArchiveDerive::Enum(info) => super::impl_enum(&info),
    };

    TokenStream::from(quote! {
        const _: () = {
            #archive_impls
        };
    })
}
