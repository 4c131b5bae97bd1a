use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Fields, Member, Type};

use super::{ArchiveMeta, FieldAttributes};

/// One field of a struct.
pub(crate) struct StructField<'a> {
    pub member: Member,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
    /// The key the field is archived under.
    pub name: String,
}

/// A struct archived through its field-descriptor table.
pub(crate) struct ArchiveStruct<'a> {
    meta: ArchiveMeta<'a>,
    fields: Vec<StructField<'a>>,
}

impl<'a> ArchiveStruct<'a> {
    pub fn new(meta: ArchiveMeta<'a>, fields: &'a Fields) -> syn::Result<Self> {
        let mut parsed = Vec::with_capacity(fields.len());
        let mut base: Option<Span> = None;

        for (index, field) in fields.iter().enumerate() {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            if let Some(span) = attrs.base {
                if base.is_some() {
                    return Err(syn::Error::new(span, "only one field can be `base`"));
                }
                base = Some(span);
            }

            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(syn::Index {
                    index: index as u32,
                    span: field.span(),
                }),
            };
            let name = match (&attrs.rename, &field.ident) {
                (Some(rename), _) => rename.value(),
                (None, Some(ident)) => ident.to_string().trim_start_matches("r#").to_owned(),
                (None, None) => index.to_string(),
            };
            parsed.push(StructField {
                member,
                ty: &field.ty,
                attrs,
                name,
            });
        }

        Ok(Self {
            meta,
            fields: parsed,
        })
    }

    #[inline]
    pub fn meta(&self) -> &ArchiveMeta<'a> {
        &self.meta
    }

    #[inline]
    pub fn fields(&self) -> &[StructField<'a>] {
        &self.fields
    }

    /// The fields written by the field walk, in declaration order.
    pub fn active_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields
            .iter()
            .filter(|field| field.attrs.base.is_none())
    }

    pub fn base_field(&self) -> Option<&StructField<'a>> {
        self.fields.iter().find(|field| field.attrs.base.is_some())
    }
}
