use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields};

use crate::attr;
use crate::utils::crate_name;

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let crate_name = crate_name();

    match &input.data {
        Data::Struct(data) => expand_struct(name, &crate_name, &input, data),
        Data::Enum(data) => expand_enum(name, &crate_name, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "Loggable cannot be derived for unions",
        )),
    }
}

fn expand_struct(
    name: &syn::Ident,
    crate_name: &TokenStream,
    input: &DeriveInput,
    data: &DataStruct,
) -> syn::Result<TokenStream> {
    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "Loggable can only be derived for structs with named fields",
            ))
        }
    };

    let container = attr::parse_container(&input.attrs)?;

    let mut field_descriptors = Vec::with_capacity(fields.len());
    let mut field_values = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field.ident.as_ref().expect("named field has an ident");
        let ty = &field.ty;
        let field_attrs = attr::parse_field(&field.attrs)?;
        let wire_name = field_attrs.rename.unwrap_or_else(|| ident.to_string());

        field_descriptors.push(quote! {
            #crate_name::reflect::FieldDescriptor::new(
                #wire_name,
                <#ty as #crate_name::Loggable>::type_descriptor(),
            )
        });
        field_values.push(quote! {
            #crate_name::Loggable::to_value(&self.#ident)
        });
    }

    let struct_name = name.to_string();
    let as_type = match container.as_type {
        Some(type_name) => quote! { Some(#type_name.to_string()) },
        None => quote! { None },
    };

    Ok(quote! {
        impl #crate_name::Loggable for #name {
            fn type_descriptor() -> #crate_name::reflect::TypeDescriptor {
                #crate_name::reflect::TypeDescriptor::Struct {
                    name: #struct_name.to_string(),
                    fields: vec![ #(#field_descriptors),* ],
                    as_type: #as_type,
                }
            }

            fn to_value(&self) -> #crate_name::Value {
                #crate_name::Value::Record(vec![ #(#field_values),* ])
            }
        }
    })
}

fn expand_enum(name: &syn::Ident, crate_name: &TokenStream, data: &DataEnum) -> syn::Result<TokenStream> {
    let mut names = Vec::with_capacity(data.variants.len());
    let mut match_arms = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Loggable enums must have only unit variants",
            ));
        }
        let ident = &variant.ident;
        let variant_name = ident.to_string();
        names.push(variant_name.clone());
        match_arms.push(quote! { #name::#ident => #variant_name });
    }

    Ok(quote! {
        impl #crate_name::Loggable for #name {
            fn type_descriptor() -> #crate_name::reflect::TypeDescriptor {
                #crate_name::reflect::TypeDescriptor::Enum {
                    names: vec![ #(#names.to_string()),* ],
                }
            }

            fn to_value(&self) -> #crate_name::Value {
                #crate_name::Value::EnumName(match self {
                    #(#match_arms),*
                }.to_string())
            }
        }
    })
}
