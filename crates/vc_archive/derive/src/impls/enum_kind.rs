use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ArchiveEnum;

/// Implements `Archive` for a fieldless enum.
pub(crate) fn impl_enum(info: &ArchiveEnum) -> TokenStream {
    let meta = info.meta();
    let vc_archive_path = meta.vc_archive_path();
    let archive_ = crate::path::archive_(vc_archive_path);
    let error_ = crate::path::error_(vc_archive_path);
    let serializer_ = crate::path::serializer_(vc_archive_path);
    let deserializer_ = crate::path::deserializer_(vc_archive_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.generics().split_for_impl();
    let type_name = meta.type_name_tokens();
    let repr = info.repr();
    let variants = info.variants();
    let fallback = info.fallback();

    quote! {
        impl #impl_generics #archive_ for #ident #ty_generics #where_clause {
            #[inline]
            fn type_name() -> &'static str {
                #type_name
            }

            fn serialize(
                &self,
                s: &mut #serializer_<'_>,
                key: &str,
            ) -> ::core::result::Result<(), #error_> {
                let base: #repr = match self {
                    #(Self::#variants => Self::#variants as #repr,)*
                };
                s.write_enum(base, <Self as #archive_>::type_name(), key)
            }

            fn deserialize(
                d: &mut #deserializer_<'_>,
                key: &str,
            ) -> ::core::result::Result<Self, #error_> {
                let base: #repr = d.read_enum(key)?;
                #(
                    if base == Self::#variants as #repr {
                        return ::core::result::Result::Ok(Self::#variants);
                    }
                )*
                ::core::result::Result::Err(#error_::unknown_discriminant(
                    key,
                    <Self as #archive_>::type_name(),
                    base,
                ))
            }

            #[inline]
            fn fallback() -> ::core::option::Option<Self> {
                ::core::option::Option::Some(Self::#fallback)
            }
        }
    }
}
