use crate::{DialectProfile, SQLSERVER, SqlWriter, writer::Context};

/// Writer for Microsoft SQL Server.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqlServerSqlWriter;

impl SqlWriter for SqlServerSqlWriter {
    fn profile(&self) -> &'static DialectProfile {
        &SQLSERVER
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('[');
        self.write_escaped(context, out, value, ']', "]]");
        out.push(']');
    }
}
