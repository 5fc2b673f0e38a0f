//! Per entity CRUD sequencing over an [`Executor`].
//!
//! Every function renders its statement with the writer of the executor dialect, runs it and
//! keeps the snapshot of the entity in sync. Nothing here holds state.

use keel_core::{
    Context, Entity, Error, Executor, Finder, MultipleRowsError, QueryResult, RecordNotFound,
    Registry, Result, RowsAffected, ValidationError, Value, capture, finder_columns, from_row,
    insert_columns, key_columns, load, stream::StreamExt, update_columns,
};
use log::Level;
use std::pin::pin;

/// Insert `entity`, then assign the generated primary key back to it.
///
/// The key is read from the returning clause or the out parameter when the dialect has one,
/// otherwise from the last insert id reported by the executor.
pub async fn insert<X: Executor, E: Entity>(executor: &mut X, entity: &mut E) -> Result<RowsAffected> {
    let model = Registry::global().model::<E>()?;
    let columns = insert_columns(&model.shape, &entity.values())?;
    let dialect = executor.dialect();
    let statement = dialect.sql_writer().write_insert(&model.shape, &columns);
    log::debug!("{statement}");
    let generated_column = statement
        .out_param
        .as_ref()
        .map(|v| v.column.clone())
        .or_else(|| statement.returning.clone());
    let mut affected = RowsAffected::default();
    let mut generated = None::<Value>;
    {
        let mut stream = pin!(executor.run(statement));
        while let Some(item) = stream.next().await {
            match item? {
                QueryResult::Row(row) => {
                    if let Some(column) = &generated_column {
                        generated = row.get_column(column).cloned().or(generated);
                    }
                }
                QueryResult::Affected(v) => affected.extend([v]),
            }
        }
    }
    if let Some(primary) = model.shape.primary_field() {
        let value = generated.or_else(|| {
            affected
                .last_affected_id
                .filter(|_| dialect.profile().supports_last_insert_id)
                .map(|v| Value::Int64(Some(v)))
        });
        if let Some(value) = value.filter(|v| !v.is_null()) {
            entity.assign_value(primary.leaf, value).with_context(|| {
                format!("While assigning the generated key of `{}`", E::NAME)
            })?;
        }
    }
    if model.partial_update() {
        capture(&model.shape, entity);
    }
    Ok(affected)
}

/// Update the row of `entity`.
///
/// With `changed_only` and a model registered with `partial_update`, only the columns that
/// differ from the snapshot are written. The snapshot is replaced after a successful update
/// and left untouched on failure.
pub async fn update<X: Executor, E: Entity>(
    executor: &mut X,
    entity: &mut E,
    changed_only: bool,
) -> Result<RowsAffected> {
    let model = Registry::global().model::<E>()?;
    let values = entity.values();
    let changed = if changed_only && model.partial_update() {
        keel_core::changed_paths(&model.shape, entity)
    } else {
        None
    };
    let columns = update_columns(&model, &values, changed.as_deref())?;
    let key = key_columns(&model.shape, &values)?;
    let statement = executor
        .dialect()
        .sql_writer()
        .write_update(&model.shape, &columns, &key);
    log::debug!("{statement}");
    let affected = executor.execute(statement).await?;
    if model.partial_update() {
        capture(&model.shape, entity);
    }
    Ok(affected)
}

/// Load the entity whose key (primary field, or composite group in field name order) is `key`.
pub async fn find_by_primary_key<X: Executor, E: Entity + Default>(
    executor: &mut X,
    key: Vec<Value>,
) -> Result<E> {
    let model = Registry::global().model::<E>()?;
    let finder = Finder {
        fields: model.shape.key_fields(),
    };
    let key = finder_columns(&model.shape, &finder, key)?;
    let statement = executor
        .dialect()
        .sql_writer()
        .write_select_by(&model.shape, &key);
    log::debug!("{statement}");
    from_row(&executor.fetch_one(statement).await?)
}

/// Load the entity matching a declared finder, `values` given in the order of `fields`.
pub async fn find_one_by<X: Executor, E: Entity + Default>(
    executor: &mut X,
    fields: &[&str],
    values: Vec<Value>,
) -> Result<E> {
    let model = Registry::global().model::<E>()?;
    let Some(finder) = model.shape.finder(fields) else {
        return Err(Error::new(ValidationError::UnknownFinder {
            entity: E::NAME,
            fields: fields.join(", "),
        }));
    };
    if values.len() != fields.len() {
        return Err(Error::msg(format!(
            "Finder ({}) of `{}` expects {} values, {} given",
            fields.join(", "),
            E::NAME,
            fields.len(),
            values.len()
        )));
    }
    let ordered = finder
        .fields
        .iter()
        .filter_map(|i| {
            let name = &model.shape.fields[*i].name;
            fields.iter().position(|v| v == name).map(|p| values[p].clone())
        })
        .collect::<Vec<_>>();
    let key = finder_columns(&model.shape, finder, ordered)?;
    let statement = executor
        .dialect()
        .sql_writer()
        .write_select_by(&model.shape, &key);
    log::debug!("{statement}");
    from_row(&executor.fetch_one(statement).await?)
}

/// Read the row of `entity` again, replacing its fields and snapshot.
pub async fn reload<X: Executor, E: Entity>(executor: &mut X, entity: &mut E) -> Result<()> {
    let model = Registry::global().model::<E>()?;
    let key = key_columns(&model.shape, &entity.values())?;
    let statement = executor
        .dialect()
        .sql_writer()
        .write_select_by(&model.shape, &key);
    log::debug!("{statement}");
    let row = executor.fetch_one(statement).await?;
    load(&row, entity)
}

/// Delete the row of `entity`, exactly one row must be affected.
pub async fn delete<X: Executor, E: Entity>(executor: &mut X, entity: &mut E) -> Result<()> {
    let model = Registry::global().model::<E>()?;
    let key = key_columns(&model.shape, &entity.values())?;
    let statement = executor
        .dialect()
        .sql_writer()
        .write_delete(&model.shape, &key);
    log::debug!("{statement}");
    let table = statement.table;
    let affected = executor.execute(statement).await?;
    let error = match affected.rows_affected {
        1 => None,
        0 => Some((
            Level::Info,
            Error::new(RecordNotFound {
                table: table.to_string(),
            }),
        )),
        n => Some((
            Level::Error,
            Error::new(MultipleRowsError {
                table: table.to_string(),
                rows: n as usize,
            }),
        )),
    };
    if let Some((level, error)) = error {
        log::log!(
            level,
            "The query deleted {} rows instead of the expected 1",
            affected.rows_affected
        );
        return Err(error);
    }
    if let Some(snapshot) = entity.snapshot_mut() {
        snapshot.clear();
    }
    Ok(())
}
