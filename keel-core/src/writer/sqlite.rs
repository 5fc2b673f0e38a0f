use crate::{DialectProfile, SQLITE, SqlWriter};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqlWriter for SqliteSqlWriter {
    fn profile(&self) -> &'static DialectProfile {
        &SQLITE
    }
}
