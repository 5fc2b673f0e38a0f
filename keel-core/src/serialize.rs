use crate::{
    Entity, EntityShape, Error, FieldDescriptor, FieldValue, Finder, Model, Registry, Result,
    ValidationError, Value, changed_paths,
};
use std::fmt::{self, Display};

/// Columns and values of an INSERT.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InsertColumns {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
    /// Positions in `values` holding sensitive data.
    pub redaction_mask: Vec<usize>,
}

/// SET list of an UPDATE.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateColumns {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
    /// Columns set to the dialect timestamp function, they carry no value.
    pub auto_timestamp_columns: Vec<String>,
    /// Positions in `values` holding sensitive data.
    pub redaction_mask: Vec<usize>,
}

/// Key columns and values of the WHERE clause of a keyed statement.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyColumns {
    /// Field indexes in the entity shape, in bind order.
    pub fields: Vec<usize>,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
    pub redaction_mask: Vec<usize>,
}

/// Columns and values to INSERT for `entity`.
///
/// The primary field is never inserted, it is generated by the database. Fields holding the
/// zero value of their type are left out.
pub fn serialize_for_insert<E: Entity>(entity: &E) -> Result<InsertColumns> {
    let model = Registry::global().model::<E>()?;
    insert_columns(&model.shape, &entity.values())
}

pub fn insert_columns(shape: &EntityShape, values: &[FieldValue]) -> Result<InsertColumns> {
    if shape.has_joined_columns {
        return Err(Error::new(ValidationError::JoinedModel {
            entity: shape.entity,
        }));
    }
    let mut result = InsertColumns::default();
    for field in &shape.fields {
        if field.role.is_primary() || !field.policy.insertable() {
            continue;
        }
        let value = &values[field.leaf];
        if !value.present || value.zero {
            continue;
        }
        if shape.is_redacted(field.column) {
            result.redaction_mask.push(result.values.len());
        }
        result.columns.push(field.column.to_string());
        result.values.push(value.value.clone());
    }
    if result.columns.is_empty() {
        return Err(Error::new(ValidationError::NothingToWrite {
            entity: shape.entity,
        }));
    }
    Ok(result)
}

/// SET list of an UPDATE of `entity`.
///
/// With `changed_only` on a model registered with `partial_update` and an entity holding a
/// synced snapshot, exactly the fields that differ from the snapshot are written, zero values
/// included. Otherwise every non zero updatable field is written. Key fields are never SET,
/// auto timestamp fields are listed apart and always written.
pub fn serialize_for_update<E: Entity>(entity: &E, changed_only: bool) -> Result<UpdateColumns> {
    let model = Registry::global().model::<E>()?;
    let changed = if changed_only && model.partial_update() {
        changed_paths(&model.shape, entity)
    } else {
        None
    };
    update_columns(&model, &entity.values(), changed.as_deref())
}

pub fn update_columns(
    model: &Model,
    values: &[FieldValue],
    changed: Option<&[String]>,
) -> Result<UpdateColumns> {
    let shape = &*model.shape;
    if shape.has_joined_columns {
        return Err(Error::new(ValidationError::JoinedModel {
            entity: shape.entity,
        }));
    }
    let key = shape.key_fields();
    let mut result = UpdateColumns::default();
    for (i, field) in shape.fields.iter().enumerate() {
        if key.contains(&i) || field.role.is_primary() || !field.policy.updatable() {
            continue;
        }
        if field.policy.auto_timestamp_on_update {
            result.auto_timestamp_columns.push(field.column.to_string());
            continue;
        }
        let value = &values[field.leaf];
        let include = match changed {
            Some(changed) => changed.iter().any(|v| *v == field.name),
            None => value.present && !value.zero,
        };
        if !include {
            continue;
        }
        if shape.is_redacted(field.column) {
            result.redaction_mask.push(result.values.len());
        }
        result.columns.push(field.column.to_string());
        result.values.push(if value.present {
            value.value.clone()
        } else {
            field.kind.empty_value()
        });
    }
    if result.columns.is_empty() && result.auto_timestamp_columns.is_empty() {
        return Err(Error::new(ValidationError::NothingToWrite {
            entity: shape.entity,
        }));
    }
    Ok(result)
}

/// Key columns and values identifying `entity`.
///
/// The primary field when declared, otherwise the first composite group bound in field name
/// order. Fails when a key field holds its zero value.
pub fn key_values<E: Entity>(entity: &E) -> Result<KeyColumns> {
    let model = Registry::global().model::<E>()?;
    key_columns(&model.shape, &entity.values())
}

pub fn key_columns(shape: &EntityShape, values: &[FieldValue]) -> Result<KeyColumns> {
    let mut result = KeyColumns::default();
    for i in shape.key_fields() {
        let field = &shape.fields[i];
        let value = &values[field.leaf];
        if !value.present || value.zero {
            return Err(Error::new(ValidationError::MissingPrimaryKey {
                entity: shape.entity,
                field: field.name.clone(),
            }));
        }
        push_key(shape, &mut result, i, field, value.value.clone());
    }
    Ok(result)
}

/// Key columns of a finder, `values` given in the finder field order.
pub fn finder_columns(shape: &EntityShape, finder: &Finder, values: Vec<Value>) -> Result<KeyColumns> {
    if values.len() != finder.fields.len() {
        return Err(Error::msg(format!(
            "Finder of `{}` expects {} values, {} given",
            shape.entity,
            finder.fields.len(),
            values.len()
        )));
    }
    let mut result = KeyColumns::default();
    for (i, value) in finder.fields.iter().copied().zip(values) {
        push_key(shape, &mut result, i, &shape.fields[i], value);
    }
    Ok(result)
}

fn push_key(
    shape: &EntityShape,
    result: &mut KeyColumns,
    index: usize,
    field: &FieldDescriptor,
    value: Value,
) {
    if shape.is_redacted(&field.qualified_column()) {
        result.redaction_mask.push(result.values.len());
    }
    result.fields.push(index);
    result.columns.push(field.qualified_column());
    result.values.push(value);
}

/// Displays a list of values hiding the masked positions.
///
/// ```rust
/// use keel_core::{Redacted, Value};
/// let values = [Value::from("John"), Value::from("secret")];
/// assert_eq!(Redacted::new(&values, &[1]).to_string(), "[\"John\", ***]");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Redacted<'a> {
    pub values: &'a [Value],
    pub mask: &'a [usize],
}

impl<'a> Redacted<'a> {
    pub fn new(values: &'a [Value], mask: &'a [usize]) -> Self {
        Self { values, mask }
    }
}

impl Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if self.mask.contains(&i) {
                f.write_str("***")?;
            } else {
                write!(f, "{v}")?;
            }
        }
        f.write_str("]")
    }
}
