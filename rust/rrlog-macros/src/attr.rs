//! Parsing for the `#[rrlog(...)]` attribute, in the same
//! `parse_nested_meta` style as the teacher macro crate's own attribute
//! handling.

use syn::{Attribute, LitStr};

/// Container-level `#[rrlog(...)]` settings.
#[derive(Default)]
pub struct ContainerAttrs {
    /// `as_type = "Name"`: derive a `TypedRecord` with `.type` fixed to
    /// `Name` instead of a plain `Record`.
    pub as_type: Option<String>,
}

/// Field-level `#[rrlog(...)]` settings.
#[derive(Default)]
pub struct FieldAttrs {
    /// `rename = "other_name"`: use `other_name` as the field's wire name.
    pub rename: Option<String>,
}

pub fn parse_container(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("rrlog") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("as_type") {
                let lit: LitStr = meta.value()?.parse()?;
                parsed.as_type = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported rrlog container attribute"))
            }
        })?;
    }
    Ok(parsed)
}

pub fn parse_field(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("rrlog") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                parsed.rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported rrlog field attribute"))
            }
        })?;
    }
    Ok(parsed)
}
