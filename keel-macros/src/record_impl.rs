use crate::{
    decode_field::{FieldMetadata, FieldMode},
    decode_table::TableMetadata,
};
use proc_macro2::TokenStream;
use quote::quote;

fn declaration(field: &FieldMetadata) -> TokenStream {
    let FieldMetadata {
        ty,
        name,
        column,
        role,
        policy,
        ..
    } = field;
    let kind = match field.mode {
        FieldMode::Embed => quote! {
            ::keel::DeclKind::Embedded {
                fields: <#ty as ::keel::Record>::declare_fields,
                optional: <#ty as ::keel::Record>::OPTIONAL,
            }
        },
        _ => quote!(::keel::DeclKind::Scalar(<#ty as ::keel::AsValue>::KIND)),
    };
    quote! {
        ::keel::FieldDecl {
            name: #name,
            column: #column,
            role: #role,
            policy: #policy,
            kind: #kind,
        }
    }
}

/// `impl Record` over the persisted fields of the struct.
pub(crate) fn record_impl(table: &TableMetadata) -> TokenStream {
    let ident = &table.ident;
    let (impl_generics, ty_generics, where_clause) = table.generics.split_for_impl();
    let persisted = table
        .fields
        .iter()
        .filter(|f| matches!(f.mode, FieldMode::Scalar | FieldMode::Embed))
        .collect::<Vec<_>>();
    let declarations = persisted.iter().map(|f| declaration(f));
    let leaf_counts = persisted.iter().map(|f| {
        let ty = &f.ty;
        match f.mode {
            FieldMode::Embed => quote!(<#ty as ::keel::Record>::leaf_count()),
            _ => quote!(1),
        }
    });
    let collect = persisted.iter().map(|f| {
        let field = &f.ident;
        match f.mode {
            FieldMode::Embed => quote!(::keel::Record::collect_values(&self.#field, out);),
            _ => quote! {
                out.push(::keel::FieldValue::new(
                    ::keel::AsValue::is_zero(&self.#field),
                    ::keel::AsValue::as_value(::std::clone::Clone::clone(&self.#field)),
                ));
            },
        }
    });
    let assign = persisted.iter().map(|f| {
        let field = &f.ident;
        let ty = &f.ty;
        match f.mode {
            FieldMode::Embed => quote! {
                let count = <#ty as ::keel::Record>::leaf_count();
                if leaf < offset + count {
                    return ::keel::Record::assign_value(&mut self.#field, leaf - offset, value);
                }
                offset += count;
            },
            _ => quote! {
                if leaf == offset {
                    self.#field = <#ty as ::keel::AsValue>::try_from_value(value)?;
                    return Ok(());
                }
                offset += 1;
            },
        }
    });
    quote! {
        impl #impl_generics ::keel::Record for #ident #ty_generics #where_clause {
            fn declare_fields() -> ::std::vec::Vec<::keel::FieldDecl> {
                ::std::vec![#(#declarations),*]
            }
            fn leaf_count() -> usize {
                0 #(+ #leaf_counts)*
            }
            #[allow(unused_variables)]
            fn collect_values(&self, out: &mut ::std::vec::Vec<::keel::FieldValue>) {
                #(#collect)*
            }
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn assign_value(&mut self, leaf: usize, value: ::keel::Value) -> ::keel::Result<()> {
                let mut offset = 0usize;
                #(#assign)*
                Err(::keel::Error::msg(::std::format!(
                    "`{}` has no field at position {}",
                    ::std::stringify!(#ident),
                    leaf
                )))
            }
        }
    }
}
