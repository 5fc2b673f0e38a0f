use crate::{EntityShape, ModelOptions, Result, ShapeCache, Snapshot, Value, ValueKind, quote_cow};
use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};
use std::{borrow::Cow, sync::Arc};

/// How a field takes part in the key of its entity.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum FieldRole {
    #[default]
    Ordinary,
    /// The single primary field.
    Primary,
    /// Member of the named composite key group.
    Composite(Cow<'static, str>),
}

impl FieldRole {
    pub fn is_primary(&self) -> bool {
        matches!(self, FieldRole::Primary)
    }
    pub fn group(&self) -> Option<&str> {
        match self {
            FieldRole::Composite(group) => Some(group),
            _ => None,
        }
    }
}

impl ToTokens for FieldRole {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append_all(match self {
            FieldRole::Ordinary => quote!(::keel::FieldRole::Ordinary),
            FieldRole::Primary => quote!(::keel::FieldRole::Primary),
            FieldRole::Composite(group) => {
                let group = quote_cow(group);
                quote!(::keel::FieldRole::Composite(#group))
            }
        });
    }
}

/// Per field persistence policy, compiled once from the `#[keel(..)]` annotations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPolicy {
    /// Never written (implies both `omit_on_insert` and `omit_on_update`).
    pub omit_always: bool,
    /// Left out of INSERT statements.
    pub omit_on_insert: bool,
    /// Left out of UPDATE statements.
    pub omit_on_update: bool,
    /// Set to the dialect timestamp function on every UPDATE.
    pub auto_timestamp_on_update: bool,
    /// The value must not appear in logs.
    pub redact_in_logs: bool,
}

impl FieldPolicy {
    /// Apply the implications between flags.
    pub const fn normalized(mut self) -> Self {
        if self.omit_always {
            self.omit_on_insert = true;
            self.omit_on_update = true;
        }
        self
    }
    pub const fn insertable(&self) -> bool {
        !self.omit_always && !self.omit_on_insert
    }
    pub const fn updatable(&self) -> bool {
        !self.omit_always && !self.omit_on_update
    }
    /// Policy of a field nested under a parent carrying `self`.
    pub const fn inherit(&self, child: FieldPolicy) -> FieldPolicy {
        FieldPolicy {
            omit_always: self.omit_always || child.omit_always,
            omit_on_insert: self.omit_on_insert || child.omit_on_insert,
            omit_on_update: self.omit_on_update || child.omit_on_update,
            auto_timestamp_on_update: child.auto_timestamp_on_update,
            redact_in_logs: self.redact_in_logs || child.redact_in_logs,
        }
        .normalized()
    }
}

impl ToTokens for FieldPolicy {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let FieldPolicy {
            omit_always,
            omit_on_insert,
            omit_on_update,
            auto_timestamp_on_update,
            redact_in_logs,
        } = self.normalized();
        tokens.append_all(quote! {
            ::keel::FieldPolicy {
                omit_always: #omit_always,
                omit_on_insert: #omit_on_insert,
                omit_on_update: #omit_on_update,
                auto_timestamp_on_update: #auto_timestamp_on_update,
                redact_in_logs: #redact_in_logs,
            }
        });
    }
}

/// What a declared field holds.
#[derive(Debug, Clone, Copy)]
pub enum DeclKind {
    /// A single column.
    Scalar(ValueKind),
    /// A nested record flattened into the parent.
    Embedded {
        fields: fn() -> Vec<FieldDecl>,
        optional: bool,
    },
}

/// One field as declared on a struct, before flattening and validation.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Rust field name.
    pub name: &'static str,
    /// Column name, `table.column` for joined columns.
    pub column: &'static str,
    pub role: FieldRole,
    pub policy: FieldPolicy,
    pub kind: DeclKind,
}

/// Value of one flattened field read from a live entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub value: Value,
    /// The field holds the zero value of its type.
    pub zero: bool,
    /// `false` when the field lives inside an absent optional embedded record.
    pub present: bool,
}

impl FieldValue {
    pub fn new(zero: bool, value: Value) -> Self {
        Self {
            value,
            zero,
            present: true,
        }
    }
    pub fn absent() -> Self {
        Self {
            value: Value::Null,
            zero: true,
            present: false,
        }
    }
}

/// A struct whose fields flatten into columns.
///
/// Implemented by `#[derive(Record)]` for embeddable structs and by `#[derive(Entity)]`.
/// Leaves are the scalar fields in depth-first declaration order, the same order in which
/// [`FieldDecl`]s are flattened into an [`EntityShape`].
pub trait Record {
    /// Whether the record may be absent (`Option<T>`).
    const OPTIONAL: bool = false;
    fn declare_fields() -> Vec<FieldDecl>;
    /// Number of scalar leaves after flattening.
    fn leaf_count() -> usize;
    /// Push the value of every leaf.
    fn collect_values(&self, out: &mut Vec<FieldValue>);
    /// Assign the leaf at `leaf` (depth-first index).
    fn assign_value(&mut self, leaf: usize, value: Value) -> Result<()>;
}

impl<T: Record + Default> Record for Option<T> {
    const OPTIONAL: bool = true;
    fn declare_fields() -> Vec<FieldDecl> {
        T::declare_fields()
    }
    fn leaf_count() -> usize {
        T::leaf_count()
    }
    fn collect_values(&self, out: &mut Vec<FieldValue>) {
        match self {
            Some(v) => v.collect_values(out),
            None => out.extend((0..T::leaf_count()).map(|_| FieldValue::absent())),
        }
    }
    fn assign_value(&mut self, leaf: usize, value: Value) -> Result<()> {
        if self.is_none() && value.is_null() {
            return Ok(());
        }
        self.get_or_insert_with(T::default).assign_value(leaf, value)
    }
}

/// Entity level declarations.
#[derive(Debug, Default, Clone)]
pub struct EntityAttributes {
    /// Joined (`table.column`) columns are allowed, the entity cannot be written.
    pub read_only: bool,
    /// Options used when the entity registers implicitly.
    pub options: ModelOptions,
    /// Field sets the entity can be looked up by.
    pub finders: Vec<Vec<&'static str>>,
}

/// A record mapped to a table row.
///
/// ```rust,ignore
/// #[derive(Entity, Default)]
/// #[keel(table = "users", partial_update)]
/// struct User {
///     #[keel(primary)]
///     id: i64,
///     name: String,
///     #[keel(sensitive)]
///     password: String,
///     #[keel(snapshot)]
///     snapshot: Snapshot,
/// }
/// ```
pub trait Entity: Record + Send + Sync + 'static {
    /// Rust type name.
    const NAME: &'static str;
    fn table_name() -> &'static str;
    fn attributes() -> EntityAttributes {
        Default::default()
    }
    /// Last synchronized values, if the entity carries a snapshot holder.
    fn snapshot(&self) -> Option<&Snapshot> {
        None
    }
    fn snapshot_mut(&mut self) -> Option<&mut Snapshot> {
        None
    }
    /// Compiled shape, computed on first use.
    fn shape() -> Result<Arc<EntityShape>>
    where
        Self: Sized,
    {
        ShapeCache::global().shape_of::<Self>()
    }
    /// Values of every flattened field.
    fn values(&self) -> Vec<FieldValue>
    where
        Self: Sized,
    {
        let mut result = Vec::with_capacity(Self::leaf_count());
        self.collect_values(&mut result);
        result
    }
}
