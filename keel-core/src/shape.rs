use crate::{
    DeclKind, Entity, EntityAttributes, FieldDecl, FieldPolicy, FieldRole, ShapeError, ValueKind,
};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::OnceLock,
};

/// Compiled metadata of one persisted (leaf) field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Path qualified field name, `billing.city` for a field nested in `billing`.
    pub name: String,
    /// Column name without table qualifier.
    pub column: &'static str,
    /// Table qualifier of a joined column.
    pub table: Option<&'static str>,
    /// Rust field names from the entity down to this field.
    pub path: Vec<&'static str>,
    pub role: FieldRole,
    pub policy: FieldPolicy,
    pub kind: ValueKind,
    /// Depth-first index of the field inside the live entity.
    pub leaf: usize,
    /// The field lives inside an optional embedded record.
    pub optional: bool,
}

impl FieldDescriptor {
    /// Column name including the table qualifier, if any.
    pub fn qualified_column(&self) -> String {
        match self.table {
            Some(table) => format!("{table}.{}", self.column),
            None => self.column.to_string(),
        }
    }
    pub fn is_nested(&self) -> bool {
        self.path.len() > 1
    }
}

/// Named group of fields forming a composite key.
#[derive(Debug, Clone)]
pub struct CompositeGroup {
    pub name: String,
    /// Field indexes, ordered by field name.
    pub fields: Vec<usize>,
}

/// Ordered set of fields a SELECT can filter on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    /// Field indexes, ordered by field name.
    pub fields: Vec<usize>,
}

/// Full compiled metadata of an entity type.
///
/// Computed once per type by [`EntityShape::compile`] and immutable afterwards.
#[derive(Debug)]
pub struct EntityShape {
    pub entity: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub primary: Option<usize>,
    pub composite_groups: Vec<CompositeGroup>,
    pub has_joined_columns: bool,
    pub read_only: bool,
    table: OnceLock<&'static str>,
    table_resolver: fn() -> &'static str,
    finders: BTreeMap<BTreeSet<String>, Finder>,
    redacted_columns: BTreeSet<String>,
}

/// Key fields used as the target of UPDATE, DELETE and keyed SELECT.
#[derive(Debug, Clone, Copy)]
pub enum KeyTarget<'a> {
    Primary(usize),
    Composite(&'a CompositeGroup),
}

impl EntityShape {
    /// Compile the shape of `E`.
    pub fn of<E: Entity>() -> Result<EntityShape, ShapeError> {
        Self::compile(
            E::NAME,
            E::table_name,
            E::declare_fields(),
            &E::attributes(),
        )
    }

    /// Flatten and validate a list of declared fields.
    ///
    /// Embedded records are flattened depth-first, their policy is combined with the one of
    /// the embedding field. Checks run in a fixed order so the same declaration always
    /// produces the same error: joined columns outside read only entities, more than one
    /// primary field, composite groups with a single member, no persisted fields, no primary
    /// field nor composite group, duplicate top level columns, finders naming unknown fields.
    pub fn compile(
        entity: &'static str,
        table_resolver: fn() -> &'static str,
        declared: Vec<FieldDecl>,
        attributes: &EntityAttributes,
    ) -> Result<EntityShape, ShapeError> {
        let mut fields = Vec::new();
        flatten(
            &mut fields,
            &declared,
            &mut Vec::new(),
            &FieldPolicy::default(),
            false,
        );
        if !attributes.read_only {
            if let Some(f) = fields.iter().find(|f| f.table.is_some()) {
                return Err(ShapeError::JoinedColumn {
                    entity,
                    field: f.name.clone(),
                    column: f.qualified_column(),
                });
            }
        }
        let mut primary = None::<usize>;
        for (i, f) in fields.iter().enumerate() {
            if !f.role.is_primary() {
                continue;
            }
            if let Some(first) = primary {
                return Err(ShapeError::DuplicatePrimary {
                    entity,
                    first: fields[first].name.clone(),
                    second: f.name.clone(),
                });
            }
            primary = Some(i);
        }
        let mut composite_groups: Vec<CompositeGroup> = Vec::new();
        for (i, f) in fields.iter().enumerate() {
            let Some(group) = f.role.group() else {
                continue;
            };
            match composite_groups.iter_mut().find(|g| g.name == group) {
                Some(g) => g.fields.push(i),
                None => composite_groups.push(CompositeGroup {
                    name: group.to_string(),
                    fields: vec![i],
                }),
            }
        }
        for group in &mut composite_groups {
            if group.fields.len() < 2 {
                return Err(ShapeError::CompositeTooSmall {
                    entity,
                    group: group.name.clone(),
                    members: group.fields.len(),
                });
            }
            group.fields.sort_by(|a, b| fields[*a].name.cmp(&fields[*b].name));
        }
        if fields.is_empty() {
            return Err(ShapeError::NoFields { entity });
        }
        if primary.is_none() && composite_groups.is_empty() {
            return Err(ShapeError::NoKey { entity });
        }
        let mut top_level = HashSet::new();
        for f in fields.iter().filter(|f| !f.is_nested()) {
            let column = f.qualified_column().to_lowercase();
            if !top_level.insert(column.clone()) {
                return Err(ShapeError::DuplicateColumn { entity, column });
            }
        }
        // Nested fields may share a column, sensitivity then applies to the column as a whole
        let redacted_columns = fields
            .iter()
            .filter(|f| f.policy.redact_in_logs)
            .map(|f| f.qualified_column().to_lowercase())
            .collect::<BTreeSet<_>>();
        let mut finders = BTreeMap::new();
        if let Some(primary) = primary {
            finders.insert(
                BTreeSet::from([fields[primary].name.clone()]),
                Finder {
                    fields: vec![primary],
                },
            );
        }
        for group in &composite_groups {
            finders.insert(
                group.fields.iter().map(|i| fields[*i].name.clone()).collect(),
                Finder {
                    fields: group.fields.clone(),
                },
            );
        }
        for declared in &attributes.finders {
            let mut indexes = Vec::with_capacity(declared.len());
            for name in declared {
                let Some(i) = fields.iter().position(|f| f.name == *name) else {
                    return Err(ShapeError::UnknownFinderField {
                        entity,
                        field: name.to_string(),
                    });
                };
                indexes.push(i);
            }
            indexes.sort_by(|a, b| fields[*a].name.cmp(&fields[*b].name));
            indexes.dedup();
            finders.insert(
                indexes.iter().map(|i| fields[*i].name.clone()).collect(),
                Finder { fields: indexes },
            );
        }
        let has_joined_columns = fields.iter().any(|f| f.table.is_some());
        log::trace!(
            "Compiled the shape of `{entity}`: {} fields, {} finders",
            fields.len(),
            finders.len()
        );
        Ok(EntityShape {
            entity,
            fields,
            primary,
            composite_groups,
            has_joined_columns,
            read_only: attributes.read_only,
            table: OnceLock::new(),
            table_resolver,
            finders,
            redacted_columns,
        })
    }

    pub fn table_name(&self) -> &'static str {
        self.table.get_or_init(self.table_resolver)
    }

    pub fn primary_field(&self) -> Option<&FieldDescriptor> {
        self.primary.map(|i| &self.fields[i])
    }

    /// The primary field or, lacking one, the first declared composite group.
    pub fn key(&self) -> Option<KeyTarget<'_>> {
        match self.primary {
            Some(i) => Some(KeyTarget::Primary(i)),
            None => self.composite_groups.first().map(KeyTarget::Composite),
        }
    }

    /// Indexes of the key fields in bind order.
    pub fn key_fields(&self) -> Vec<usize> {
        match self.key() {
            Some(KeyTarget::Primary(i)) => vec![i],
            Some(KeyTarget::Composite(group)) => group.fields.clone(),
            None => Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Finder declared on exactly the given set of fields, in any order.
    pub fn finder<S: AsRef<str>>(&self, fields: &[S]) -> Option<&Finder> {
        let key = fields
            .iter()
            .map(|v| v.as_ref().to_string())
            .collect::<BTreeSet<_>>();
        self.finders.get(&key)
    }

    pub fn finders(&self) -> impl Iterator<Item = &Finder> {
        self.finders.values()
    }

    /// Whether values written to `column` must be kept out of logs.
    pub fn is_redacted(&self, column: &str) -> bool {
        self.redacted_columns.contains(&column.to_lowercase())
    }
}

fn flatten(
    out: &mut Vec<FieldDescriptor>,
    declared: &[FieldDecl],
    path: &mut Vec<&'static str>,
    parent: &FieldPolicy,
    optional: bool,
) {
    for decl in declared {
        let policy = parent.inherit(decl.policy);
        path.push(decl.name);
        match decl.kind {
            DeclKind::Scalar(kind) => {
                let (table, column) = match decl.column.rsplit_once('.') {
                    Some((table, column)) => (Some(table), column),
                    None => (None, decl.column),
                };
                out.push(FieldDescriptor {
                    name: path.join("."),
                    column,
                    table,
                    path: path.clone(),
                    role: decl.role.clone(),
                    policy,
                    kind,
                    leaf: out.len(),
                    optional,
                });
            }
            DeclKind::Embedded {
                fields,
                optional: nested_optional,
            } => {
                flatten(out, &fields(), path, &policy, optional || nested_optional);
            }
        }
        path.pop();
    }
}
