use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ArchiveStruct, StructField};

/// Implements `Describe`, `Archive`, `Object` and `ObjectType`.
pub(crate) fn impl_struct(info: &ArchiveStruct) -> TokenStream {
    let meta = info.meta();
    let vc_archive_path = meta.vc_archive_path();
    let archive_ = crate::path::archive_(vc_archive_path);
    let object_ = crate::path::object_(vc_archive_path);
    let object_type_ = crate::path::object_type_(vc_archive_path);
    let obj_ = crate::path::obj_(vc_archive_path);
    let error_ = crate::path::error_(vc_archive_path);
    let serializer_ = crate::path::serializer_(vc_archive_path);
    let deserializer_ = crate::path::deserializer_(vc_archive_path);
    let describe_ = crate::path::describe_(vc_archive_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.generics().split_for_impl();
    let type_name = meta.type_name_tokens();

    let field_tokens = info.active_fields().map(|field| field_info_tokens(info, field));
    let base_tokens = match info.base_field() {
        Some(field) => {
            let member = &field.member;
            let name = &field.name;
            let ty = field.ty;
            quote! {
                ::core::option::Option::Some(#describe_::BaseField {
                    name: #name,
                    type_name: <#ty as #archive_>::type_name,
                    serialize: |this, s| s.write_fields(&this.#member),
                    deserialize: |this, d| d.populate(&mut this.#member),
                })
            }
        }
        None => quote!(::core::option::Option::None),
    };
    let custom_tokens = match meta.attrs().custom {
        Some(_) => quote!(::core::option::Option::Some(#describe_::CustomCodec::<Self>::OF)),
        None => quote!(::core::option::Option::None),
    };

    let hooks = &meta.attrs().hooks;
    let hook = |path: &Option<syn::Path>, arg: TokenStream| match path {
        Some(path) => quote!(::core::option::Option::Some(#path as fn(#arg))),
        None => quote!(::core::option::Option::None),
    };
    let on_serializing = hook(&hooks.on_serializing, quote!(&Self));
    let on_serialized = hook(&hooks.on_serialized, quote!(&Self));
    let on_deserializing = hook(&hooks.on_deserializing, quote!(&mut Self));
    let on_deserialized = hook(&hooks.on_deserialized, quote!(&mut Self));

    quote! {
        impl #impl_generics #describe_::Describe for #ident #ty_generics #where_clause {
            const DESCRIPTOR: &'static #describe_::Descriptor<Self> = &#describe_::Descriptor {
                fields: &[#(#field_tokens),*],
                base: #base_tokens,
                hooks: #describe_::Hooks {
                    on_serializing: #on_serializing,
                    on_serialized: #on_serialized,
                    on_deserializing: #on_deserializing,
                    on_deserialized: #on_deserialized,
                },
                custom: #custom_tokens,
            };
        }

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
                s.write_struct(self, key)
            }

            #[inline]
            fn deserialize(
                d: &mut #deserializer_<'_>,
                key: &str,
            ) -> ::core::result::Result<Self, #error_> {
                d.read_struct(key)
            }

            #[inline]
            fn fallback() -> ::core::option::Option<Self> {
                ::core::option::Option::Some(<Self as ::core::default::Default>::default())
            }
        }

        impl #impl_generics #object_ for #ident #ty_generics #where_clause {
            #[inline]
            fn runtime_type_name(&self) -> &'static str {
                <Self as #archive_>::type_name()
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl #impl_generics #object_type_ for #ident #ty_generics #where_clause {
            #[inline]
            fn static_type_name() -> &'static str {
                <Self as #archive_>::type_name()
            }

            #[inline]
            fn allocate() -> ::core::option::Option<#obj_<Self>> {
                let value = <Self as ::core::default::Default>::default();
                ::core::option::Option::Some(#obj_::new(value))
            }

            #[inline]
            fn serialize_static(
                this: &Self,
                s: &mut #serializer_<'_>,
            ) -> ::core::option::Option<::core::result::Result<(), #error_>> {
                ::core::option::Option::Some(s.write_fields(this))
            }

            #[inline]
            fn populate_static(
                this: &mut Self,
                d: &mut #deserializer_<'_>,
            ) -> ::core::option::Option<::core::result::Result<(), #error_>> {
                ::core::option::Option::Some(d.populate(this))
            }
        }
    }
}

/// One `FieldInfo` entry of the descriptor table.
fn field_info_tokens(info: &ArchiveStruct, field: &StructField) -> TokenStream {
    let vc_archive_path = info.meta().vc_archive_path();
    let describe_ = crate::path::describe_(vc_archive_path);

    let name = &field.name;
    if field.attrs.skip.is_some() {
        return quote!(#describe_::FieldInfo::skipped(#name));
    }

    let member = &field.member;
    quote! {
        #describe_::FieldInfo {
            name: #name,
            skip: false,
            serialize: |this, s, key| s.write(&this.#member, key),
            deserialize: |this, d, key| {
                this.#member = d.read(key)?;
                ::core::result::Result::Ok(())
            },
        }
    }
}
