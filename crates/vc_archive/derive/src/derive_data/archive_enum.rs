use syn::{Ident, Variant};

use super::ArchiveMeta;

/// A fieldless enum, archived as its discriminant.
pub(crate) struct ArchiveEnum<'a> {
    meta: ArchiveMeta<'a>,
    variants: Vec<&'a Ident>,
    /// The `#[default]` variant, or the first one.
    fallback: &'a Ident,
}

impl<'a> ArchiveEnum<'a> {
    pub fn new<I>(meta: ArchiveMeta<'a>, span: proc_macro2::Span, variants: I) -> syn::Result<Self>
    where
        I: IntoIterator<Item = &'a Variant>,
    {
        let mut idents = Vec::new();
        let mut fallback = None;
        for variant in variants {
            if !variant.fields.is_empty() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "`Archive` can only be derived for enums without fields",
                ));
            }
            if variant.attrs.iter().any(|attr| attr.path().is_ident("default")) {
                fallback = Some(&variant.ident);
            }
            idents.push(&variant.ident);
        }

        let fallback = match (fallback, idents.first()) {
            (Some(ident), _) => ident,
            (None, Some(ident)) => *ident,
            (None, None) => {
                return Err(syn::Error::new(span, "`Archive` cannot be derived for empty enums"));
            }
        };

        Ok(Self {
            meta,
            variants: idents,
            fallback,
        })
    }

    #[inline]
    pub fn meta(&self) -> &ArchiveMeta<'a> {
        &self.meta
    }

    #[inline]
    pub fn variants(&self) -> &[&'a Ident] {
        &self.variants
    }

    #[inline]
    pub fn fallback(&self) -> &Ident {
        self.fallback
    }

    /// The integer type the discriminant is archived as.
    pub fn repr(&self) -> Ident {
        match &self.meta.attrs().repr {
            Some(repr) => repr.clone(),
            None => Ident::new("i32", proc_macro2::Span::call_site()),
        }
    }
}
