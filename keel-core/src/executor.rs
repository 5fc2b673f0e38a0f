use crate::{
    Dialect, Entity, MultipleRowsError, QueryResult, RecordNotFound, Result, RowLabeled,
    RowsAffected, Statement, load,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

/// Runs statements against a database.
///
/// Keel never opens connections nor manages transactions, an executor wraps whatever the
/// application uses for that. Only [`Executor::run`] must be implemented.
pub trait Executor: Send + Sized {
    /// SQL family the statements are rendered for.
    fn dialect(&self) -> Dialect;

    /// Send any statement and stream back every result (either row or count).
    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the statement and returns the rows.
    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(statement).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute(&mut self, statement: Statement) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(statement)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    fn fetch_all(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        self.fetch(statement).try_collect()
    }

    /// Exactly one row, [`RecordNotFound`] or [`MultipleRowsError`] otherwise.
    fn fetch_one(&mut self, statement: Statement) -> impl Future<Output = Result<RowLabeled>> + Send {
        let table = statement.table;
        let rows = self.fetch_all(statement);
        async move {
            let mut rows = rows.await?;
            match rows.len() {
                1 => Ok(rows.swap_remove(0)),
                0 => Err(RecordNotFound {
                    table: table.to_string(),
                }
                .into()),
                n => Err(MultipleRowsError {
                    table: table.to_string(),
                    rows: n,
                }
                .into()),
            }
        }
    }

    /// Fetch exactly one row and [`load`] it into `entity`.
    fn scan_into<E: Entity>(
        &mut self,
        statement: Statement,
        entity: &mut E,
    ) -> impl Future<Output = Result<()>> + Send {
        let row = self.fetch_one(statement);
        async move { load(&row.await?, entity) }
    }

    /// Call `handler` on every row, stopping at the first error.
    fn for_each_row<F>(
        &mut self,
        statement: Statement,
        mut handler: F,
    ) -> impl Future<Output = Result<()>> + Send
    where
        F: FnMut(RowLabeled) -> Result<()> + Send,
    {
        self.fetch(statement)
            .try_for_each(move |row| futures::future::ready(handler(row)))
    }
}
