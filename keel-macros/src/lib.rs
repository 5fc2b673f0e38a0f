mod decode_field;
mod decode_table;
mod entity_impl;
mod record_impl;

use decode_table::decode_table;
use entity_impl::entity_impl;
use proc_macro::TokenStream;
use quote::quote;
use record_impl::record_impl;
use syn::{DeriveInput, parse_macro_input};

/// Map a struct to a table row.
///
/// Struct attributes: `#[keel(table = "name", read_only, partial_update, find_by = "a, b")]`.
/// Field attributes: `#[keel(column = "name", primary, role = "composite:<group>", omit,
/// insertable = false, updatable = false, auto_timestamp_on_update, sensitive, skip, embed,
/// snapshot)]`. Unknown keys are ignored.
#[proc_macro_derive(Entity, attributes(keel))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let table = match decode_table(input) {
        Ok(v) => v,
        Err(e) => return e.into_compile_error().into(),
    };
    let record = record_impl(&table);
    let entity = match entity_impl(&table) {
        Ok(v) => v,
        Err(e) => return e.into_compile_error().into(),
    };
    quote! {
        #record
        #entity
    }
    .into()
}

/// Flatten a struct into the columns of the entities embedding it (`#[keel(embed)]`).
#[proc_macro_derive(Record, attributes(keel))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match decode_table(input) {
        Ok(table) => record_impl(&table).into(),
        Err(e) => e.into_compile_error().into(),
    }
}
