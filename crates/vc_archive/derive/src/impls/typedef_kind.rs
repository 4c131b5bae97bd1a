use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ArchiveStruct;

/// Implements `Archive` for a single-field tuple struct.
pub(crate) fn impl_typedef(info: &ArchiveStruct) -> TokenStream {
    let meta = info.meta();
    let vc_archive_path = meta.vc_archive_path();
    let archive_ = crate::path::archive_(vc_archive_path);
    let error_ = crate::path::error_(vc_archive_path);
    let serializer_ = crate::path::serializer_(vc_archive_path);
    let deserializer_ = crate::path::deserializer_(vc_archive_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.generics().split_for_impl();
    let type_name = meta.type_name_tokens();
    let inner = info.fields()[0].ty;

    quote! {
        impl #impl_generics #archive_ for #ident #ty_generics #where_clause {
            #[inline]
            fn type_name() -> &'static str {
                #type_name
            }

            #[inline]
            fn serialize(
                &self,
                s: &mut #serializer_<'_>,
                key: &str,
            ) -> ::core::result::Result<(), #error_> {
                s.write_typedef(<Self as #archive_>::type_name(), &self.0, key)
            }

            #[inline]
            fn deserialize(
                d: &mut #deserializer_<'_>,
                key: &str,
            ) -> ::core::result::Result<Self, #error_> {
                d.read_typedef::<#inner>(key).map(Self)
            }

            #[inline]
            fn fallback() -> ::core::option::Option<Self> {
                <#inner as #archive_>::fallback().map(Self)
            }
        }
    }
}
