use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::{
    borrow::Cow,
    cmp::min,
    fmt::{self, Display},
};
use syn::Path;

pub fn quote_cow<T: ToOwned + ToTokens + ?Sized>(value: &Cow<T>) -> TokenStream
where
    <T as ToOwned>::Owned: ToTokens,
{
    match value {
        Cow::Borrowed(v) => quote! { ::std::borrow::Cow::Borrowed(#v) },
        Cow::Owned(v) => quote! { ::std::borrow::Cow::Borrowed(#v) },
    }
}

/// Whether the trailing segments of `path` are `expect`.
pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Longest prefix of `value` not exceeding `max` bytes, cut on a char boundary.
pub fn truncated(value: &str, max: usize) -> (&str, bool) {
    if value.len() <= max {
        return (value, false);
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    (&value[..end], true)
}

/// Displays a possibly long text cut to a readable length.
pub struct Truncated<'a>(pub &'a str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, cut) = truncated(self.0, 497);
        write!(f, "{}{}", head.trim_end(), if cut { "..." } else { "" })
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::Truncated(::core::convert::AsRef::<str>::as_ref(&$query))
    };
}
