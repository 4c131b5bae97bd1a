use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use super::{ArchiveEnum, ArchiveMeta, ArchiveStruct, TypeAttributes};

/// The shape the derive was applied to.
pub(crate) enum ArchiveDerive<'a> {
    /// Named fields, several unnamed fields, or none.
    Struct(ArchiveStruct<'a>),
    /// A single unnamed field.
    Typedef(ArchiveStruct<'a>),
    Enum(ArchiveEnum<'a>),
}

impl<'a> ArchiveDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;
        let meta = ArchiveMeta::new(attrs, &input.ident, &input.generics);

        match &input.data {
            Data::Struct(data) => {
                let is_typedef =
                    matches!(&data.fields, Fields::Unnamed(fields) if fields.unnamed.len() == 1)
                        && meta.attrs().custom.is_none();
                let info = ArchiveStruct::new(meta, &data.fields)?;
                match is_typedef {
                    true => {
                        let field = &info.fields()[0];
                        if let Some(span) = field.attrs.skip.or(field.attrs.base) {
                            return Err(syn::Error::new(
                                span,
                                "the field of a single-field tuple struct is always archived",
                            ));
                        }
                        Ok(Self::Typedef(info))
                    }
                    false => Ok(Self::Struct(info)),
                }
            }
            Data::Enum(data) => {
                if let Some(span) = meta.attrs().custom {
                    return Err(syn::Error::new(span, "`custom` is not supported on enums"));
                }
                ArchiveEnum::new(meta, input.ident.span(), &data.variants).map(Self::Enum)
            }
            Data::Union(data) => Err(syn::Error::new(
                data.union_token.span(),
                "`Archive` cannot be derived for unions",
            )),
        }
    }
}
