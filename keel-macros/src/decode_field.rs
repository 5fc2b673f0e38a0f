use keel_core::{FieldPolicy, FieldRole, matches_path};
use proc_macro2::TokenTree;
use std::borrow::Cow;
use syn::{
    Error, Expr, Field, Ident, LitBool, LitStr, Result, Token, Type, ext::IdentExt,
    meta::ParseNestedMeta, spanned::Spanned,
};

/// How a struct field takes part in the generated impls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldMode {
    /// One column.
    Scalar,
    /// A nested `Record` flattened into the parent.
    Embed,
    /// The snapshot holder of the entity.
    Snapshot,
    /// Not persisted.
    Skip,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) role: FieldRole,
    pub(crate) policy: FieldPolicy,
    pub(crate) mode: FieldMode,
}

/// Consume the value of a key this macro does not know about.
pub(crate) fn skip_unknown(arg: &ParseNestedMeta) -> Result<()> {
    if arg.input.peek(Token![=]) {
        arg.value()?.parse::<Expr>()?;
    } else if arg.input.peek(syn::token::Paren) {
        arg.input.parse::<TokenTree>()?;
    }
    Ok(())
}

pub(crate) fn flag(arg: &ParseNestedMeta) -> Result<bool> {
    if arg.input.peek(Token![=]) {
        Ok(arg.value()?.parse::<LitBool>()?.value)
    } else {
        Ok(true)
    }
}

fn decode_role(value: &LitStr) -> Result<FieldRole> {
    let role = value.value();
    match role.trim() {
        "primary" => Ok(FieldRole::Primary),
        "ordinary" | "" => Ok(FieldRole::Ordinary),
        v => match v.strip_prefix("composite:") {
            Some(group) if !group.trim().is_empty() => {
                Ok(FieldRole::Composite(Cow::Owned(group.trim().to_string())))
            }
            _ => Err(Error::new(
                value.span(),
                format!(
                    "Unknown role `{role}`, use `role = \"primary\"` or `role = \"composite:<group>\"`"
                ),
            )),
        },
    }
}

pub(crate) fn decode_field(field: &Field) -> Result<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(Error::new(field.span(), "Fields are expected to have a name"));
    };
    let name = ident.unraw().to_string();
    let mut column = name.strip_prefix('_').unwrap_or(&name).to_string();
    let mut role = FieldRole::Ordinary;
    let mut policy = FieldPolicy::default();
    let mut mode = match &field.ty {
        Type::Path(v) if matches_path(&v.path, &["keel", "Snapshot"]) => FieldMode::Snapshot,
        _ => FieldMode::Scalar,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("keel") {
            continue;
        }
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") || arg.path.is_ident("name") {
                column = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("role") {
                role = decode_role(&arg.value()?.parse::<LitStr>()?)?;
            } else if arg.path.is_ident("primary") || arg.path.is_ident("primary_key") {
                if flag(&arg)? {
                    role = FieldRole::Primary;
                }
            } else if arg.path.is_ident("omit") {
                policy.omit_always = flag(&arg)?;
            } else if arg.path.is_ident("insertable") {
                policy.omit_on_insert = !flag(&arg)?;
            } else if arg.path.is_ident("updatable") {
                policy.omit_on_update = !flag(&arg)?;
            } else if arg.path.is_ident("auto_timestamp_on_update") {
                policy.auto_timestamp_on_update = flag(&arg)?;
            } else if arg.path.is_ident("sensitive") {
                policy.redact_in_logs = flag(&arg)?;
            } else if arg.path.is_ident("skip") {
                if flag(&arg)? {
                    mode = FieldMode::Skip;
                }
            } else if arg.path.is_ident("embed") {
                if flag(&arg)? {
                    mode = FieldMode::Embed;
                }
            } else if arg.path.is_ident("snapshot") {
                if flag(&arg)? {
                    mode = FieldMode::Snapshot;
                }
            } else {
                skip_unknown(&arg)?;
            }
            Ok(())
        })?;
    }
    if column.is_empty() {
        return Err(Error::new(ident.span(), "Column name cannot be empty"));
    }
    Ok(FieldMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        column,
        role,
        policy: policy.normalized(),
        mode,
    })
}
