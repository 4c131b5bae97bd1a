use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Generics, Ident, Path, parse_quote};

use super::TypeAttributes;

/// What every generated impl needs to know about the type.
pub(crate) struct ArchiveMeta<'a> {
    vc_archive_path: Path,
    attrs: TypeAttributes,
    ident: &'a Ident,
    generics: Generics,
}

impl<'a> ArchiveMeta<'a> {
    /// Adds an `Archive` bound to every type parameter.
    pub fn new(attrs: TypeAttributes, ident: &'a Ident, generics: &Generics) -> Self {
        let vc_archive_path = crate::path::vc_archive(attrs.crate_path.as_ref());
        let archive_ = crate::path::archive_(&vc_archive_path);

        let mut generics = generics.clone();
        let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
        let where_clause = generics.make_where_clause();
        for param in params {
            where_clause.predicates.push(parse_quote!(#param: #archive_));
        }

        Self {
            vc_archive_path,
            attrs,
            ident,
            generics,
        }
    }

    #[inline]
    pub fn vc_archive_path(&self) -> &Path {
        &self.vc_archive_path
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn generics(&self) -> &Generics {
        &self.generics
    }

    /// The body of `Archive::type_name`.
    ///
    /// Non-generic types get a compile-time name built from the module
    /// path, generic ones fall back to `core::any::type_name`.
    pub fn type_name_tokens(&self) -> TokenStream {
        if let Some(rename) = &self.attrs.rename {
            return rename.to_token_stream();
        }
        if self.generics.params.is_empty() {
            let name = self.ident.to_string();
            quote! {
                ::core::concat!(::core::module_path!(), "::", #name)
            }
        } else {
            quote! {
                ::core::any::type_name::<Self>()
            }
        }
    }
}
