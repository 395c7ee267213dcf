//! Proc macros for the `rrlog` crate: `#[derive(Loggable)]` generates the
//! `type_descriptor`/`to_value` pair component C7 needs to derive a schema
//! from a Rust type, the way `#[derive(Serialize)]` generates a
//! `serde::Serialize` impl.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attr;
mod derive;
mod utils;

/// Derives [`Loggable`](https://docs.rs/rrlog/latest/rrlog/trait.Loggable.html)
/// for a struct with named fields or a field-less (C-like) enum.
///
/// A struct maps to a `Record` schema; add a container attribute
/// `#[rrlog(as_type = "Name")]` to instead derive a `TypedRecord` schema
/// with `.type` fixed to `"Name"`. A field can be renamed on the wire with
/// `#[rrlog(rename = "other_name")]`.
#[proc_macro_derive(Loggable, attributes(rrlog))]
pub fn derive_loggable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
