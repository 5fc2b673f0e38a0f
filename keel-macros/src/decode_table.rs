use crate::decode_field::{FieldMetadata, decode_field, flag, skip_unknown};
use convert_case::{Case, Casing};
use keel_core::ShapeError;
use syn::{Data, DeriveInput, Error, Fields, Generics, Ident, LitStr, Result};

pub(crate) struct TableMetadata {
    pub(crate) ident: Ident,
    pub(crate) generics: Generics,
    pub(crate) name: String,
    pub(crate) read_only: bool,
    pub(crate) partial_update: bool,
    pub(crate) finders: Vec<Vec<String>>,
    pub(crate) fields: Vec<FieldMetadata>,
}

pub(crate) fn decode_table(input: DeriveInput) -> Result<TableMetadata> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(not_a_struct(&input.ident)),
        },
        _ => return Err(not_a_struct(&input.ident)),
    };
    let fields = fields.iter().map(decode_field).collect::<Result<Vec<_>>>()?;
    let mut name = input.ident.to_string().to_case(Case::Snake);
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut read_only = false;
    let mut partial_update = false;
    let mut finders = Vec::new();
    for attr in &input.attrs {
        if !attr.path().is_ident("keel") {
            continue;
        }
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") || arg.path.is_ident("name") {
                name = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("read_only") {
                read_only = flag(&arg)?;
            } else if arg.path.is_ident("partial_update") {
                partial_update = flag(&arg)?;
            } else if arg.path.is_ident("find_by") {
                let value = arg.value()?.parse::<LitStr>()?;
                let finder = value
                    .value()
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>();
                if finder.is_empty() {
                    return Err(Error::new(
                        value.span(),
                        "Expected a list of fields, use it like: `#[keel(find_by = \"a, b\")]`",
                    ));
                }
                finders.push(finder);
            } else {
                skip_unknown(&arg)?;
            }
            Ok(())
        })?;
    }
    Ok(TableMetadata {
        ident: input.ident,
        generics: input.generics,
        name,
        read_only,
        partial_update,
        finders,
        fields,
    })
}

fn not_a_struct(ident: &Ident) -> Error {
    let entity = String::leak(ident.to_string());
    Error::new(ident.span(), ShapeError::NotAStruct { entity })
}
