use crate::{Context, Entity, EntityShape, Registry, Result, RowLabeled, capture};

/// Assign the columns of `row` to the fields of `entity`.
///
/// Columns are matched case-insensitively, joined fields also by `table.column`. Fields
/// without a matching column keep their value. Integers are converted only when the value
/// fits the field exactly, otherwise an [`crate::OverflowError`] is returned.
pub fn deserialize<E: Entity>(row: &RowLabeled, entity: &mut E) -> Result<()> {
    let shape = E::shape()?;
    assign(&shape, row, entity)
}

fn assign<E: Entity>(shape: &EntityShape, row: &RowLabeled, entity: &mut E) -> Result<()> {
    for field in &shape.fields {
        let value = match field.table {
            Some(..) => row
                .get_column(&field.qualified_column())
                .or_else(|| row.get_column(field.column)),
            None => row.get_column(field.column),
        };
        let Some(value) = value else {
            continue;
        };
        entity
            .assign_value(field.leaf, value.clone())
            .with_context(|| {
                format!(
                    "While decoding column `{}` into `{}::{}`",
                    field.qualified_column(),
                    E::NAME,
                    field.name
                )
            })?;
    }
    Ok(())
}

/// [`deserialize`] and, for models registered with `partial_update`, capture a snapshot.
pub fn load<E: Entity>(row: &RowLabeled, entity: &mut E) -> Result<()> {
    let model = Registry::global().model::<E>()?;
    assign(&model.shape, row, entity)?;
    if model.partial_update() {
        capture(&model.shape, entity);
    }
    Ok(())
}

/// Build a new entity from `row`, see [`load`].
pub fn from_row<E: Entity + Default>(row: &RowLabeled) -> Result<E> {
    let mut entity = E::default();
    load(row, &mut entity)?;
    Ok(entity)
}
