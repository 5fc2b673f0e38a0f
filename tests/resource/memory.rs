use keel::{
    Dialect, Error, Executor, QueryResult, Result, RowLabeled, RowsAffected, Statement, stream,
};
use log::LevelFilter;
use std::{collections::VecDeque, env};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Executor recording every statement and answering with scripted results.
///
/// Each call to `run` pops the next scripted response, no results when none is left.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    pub dialect: Dialect,
    pub statements: Vec<Statement>,
    pub responses: VecDeque<Result<Vec<QueryResult>>>,
}

impl MemoryExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }
    pub fn respond(&mut self, results: impl IntoIterator<Item = QueryResult>) -> &mut Self {
        self.responses.push_back(Ok(results.into_iter().collect()));
        self
    }
    pub fn respond_affected(&mut self, rows_affected: u64, last_affected_id: Option<i64>) -> &mut Self {
        self.respond([RowsAffected {
            rows_affected,
            last_affected_id,
        }
        .into()])
    }
    pub fn respond_rows(&mut self, rows: impl IntoIterator<Item = RowLabeled>) -> &mut Self {
        self.respond(rows.into_iter().map(QueryResult::from))
    }
    pub fn respond_error(&mut self, message: &'static str) -> &mut Self {
        self.responses.push_back(Err(Error::msg(message)));
        self
    }
    pub fn last_statement(&self) -> &Statement {
        self.statements.last().expect("no statement was run")
    }
    pub fn last_sql(&self) -> &str {
        &self.last_statement().sql
    }
}

impl Executor for MemoryExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn run(
        &mut self,
        statement: Statement,
    ) -> impl stream::Stream<Item = Result<QueryResult>> + Send {
        self.statements.push(statement);
        let results: Vec<Result<QueryResult>> = match self.responses.pop_front() {
            Some(Ok(results)) => results.into_iter().map(Ok).collect(),
            Some(Err(e)) => vec![Err(e)],
            None => Vec::new(),
        };
        stream::iter(results)
    }
}
