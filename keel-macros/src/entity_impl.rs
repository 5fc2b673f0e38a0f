use crate::{decode_field::FieldMode, decode_table::TableMetadata};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Result};

/// `impl Entity`, table level attributes and the snapshot accessors.
pub(crate) fn entity_impl(table: &TableMetadata) -> Result<TokenStream> {
    let ident = &table.ident;
    let (impl_generics, ty_generics, where_clause) = table.generics.split_for_impl();
    let name = &table.name;
    let read_only = table.read_only;
    let partial_update = table.partial_update;
    let finders = table.finders.iter().map(|v| quote!(::std::vec![#(#v),*]));
    let mut snapshots = table
        .fields
        .iter()
        .filter(|f| f.mode == FieldMode::Snapshot);
    let snapshot = snapshots.next();
    if let Some(second) = snapshots.next() {
        return Err(Error::new(
            second.ident.span(),
            "An entity can hold a single snapshot field",
        ));
    }
    let snapshot = snapshot.map(|f| {
        let field = &f.ident;
        quote! {
            fn snapshot(&self) -> ::std::option::Option<&::keel::Snapshot> {
                ::std::option::Option::Some(&self.#field)
            }
            fn snapshot_mut(&mut self) -> ::std::option::Option<&mut ::keel::Snapshot> {
                ::std::option::Option::Some(&mut self.#field)
            }
        }
    });
    Ok(quote! {
        impl #impl_generics ::keel::Entity for #ident #ty_generics #where_clause {
            const NAME: &'static str = ::std::stringify!(#ident);
            fn table_name() -> &'static str {
                #name
            }
            fn attributes() -> ::keel::EntityAttributes {
                ::keel::EntityAttributes {
                    read_only: #read_only,
                    options: ::keel::ModelOptions {
                        partial_update: #partial_update,
                    },
                    finders: ::std::vec![#(#finders),*],
                }
            }
            #snapshot
        }
    })
}
