use crate::{DialectProfile, POSTGRES, SqlWriter};

/// Writer for PostgreSQL and the servers speaking its dialect.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter;

impl SqlWriter for PostgresSqlWriter {
    fn profile(&self) -> &'static DialectProfile {
        &POSTGRES
    }
}
