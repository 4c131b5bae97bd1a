//! Provide some tools for parsing `#[archive(...)]` attributes.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Path};

use crate::ARCHIVE_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// Lifecycle hooks named in type attributes.
#[derive(Default)]
pub(crate) struct HookPaths {
    pub on_serializing: Option<Path>,
    pub on_serialized: Option<Path>,
    pub on_deserializing: Option<Path>,
    pub on_deserialized: Option<Path>,
}

/// Attributes on the type itself.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[archive(rename = "...")]`
    pub rename: Option<LitStr>,
    /// `#[archive(custom)]`
    pub custom: Option<Span>,
    /// `#[archive(crate = "...")]`
    pub crate_path: Option<Path>,
    pub hooks: HookPaths,
    /// The integer type of `#[repr(...)]`, if any.
    pub repr: Option<syn::Ident>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if attr.path().is_ident(ARCHIVE_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| this.parse_meta(meta))?;
            } else if attr.path().is_ident("repr") {
                attr.parse_nested_meta(|meta| {
                    // `C`, `align(..)` and the like say nothing about the discriminant.
                    if let Some(ident) = meta.path.get_ident()
                        && is_integer(ident)
                    {
                        this.repr = Some(ident.clone());
                    }
                    if meta.input.peek(syn::token::Paren) {
                        let _content;
                        syn::parenthesized!(_content in meta.input);
                    }
                    Ok(())
                })?;
            }
        }
        Ok(this)
    }

    fn parse_meta(&mut self, meta: ParseNestedMeta<'_>) -> syn::Result<()> {
        let path = &meta.path;
        if path.is_ident("rename") {
            set_once(&mut self.rename, meta.value()?.parse()?, path)
        } else if path.is_ident("custom") {
            set_once(&mut self.custom, path.span(), path)
        } else if path.is_ident("crate") {
            let lit: LitStr = meta.value()?.parse()?;
            set_once(&mut self.crate_path, lit.parse()?, path)
        } else if path.is_ident("on_serializing") {
            set_once(&mut self.hooks.on_serializing, meta.value()?.parse()?, path)
        } else if path.is_ident("on_serialized") {
            set_once(&mut self.hooks.on_serialized, meta.value()?.parse()?, path)
        } else if path.is_ident("on_deserializing") {
            set_once(&mut self.hooks.on_deserializing, meta.value()?.parse()?, path)
        } else if path.is_ident("on_deserialized") {
            set_once(&mut self.hooks.on_deserialized, meta.value()?.parse()?, path)
        } else {
            Err(meta.error(
                "unknown type attribute, expected one of `rename`, `custom`, `crate`, \
                 `on_serializing`, `on_serialized`, `on_deserializing`, `on_deserialized`",
            ))
        }
    }
}

fn is_integer(ident: &syn::Ident) -> bool {
    matches!(
        ident.to_string().as_str(),
        "i8" | "u8" | "i16" | "u16" | "i32" | "u32" | "i64" | "u64" | "i128" | "u128" | "isize"
            | "usize"
    )
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Attributes on a single field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// `#[archive(skip)]`
    pub skip: Option<Span>,
    /// `#[archive(base)]`
    pub base: Option<Span>,
    /// `#[archive(rename = "...")]`
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(ARCHIVE_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("skip") {
                    set_once(&mut this.skip, path.span(), path)
                } else if path.is_ident("base") {
                    set_once(&mut this.base, path.span(), path)
                } else if path.is_ident("rename") {
                    set_once(&mut this.rename, meta.value()?.parse()?, path)
                } else {
                    Err(meta.error("unknown field attribute, expected `skip`, `base` or `rename`"))
                }
            })?;
        }

        if let (Some(_), Some(base)) = (this.skip, this.base) {
            return Err(syn::Error::new(base, "a field cannot be both `skip` and `base`"));
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// Utilities

fn set_once<T>(slot: &mut Option<T>, value: T, path: &Path) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(path.span(), "duplicate attribute"));
    }
    *slot = Some(value);
    Ok(())
}
