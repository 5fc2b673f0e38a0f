use crate::{DialectProfile, MYSQL, SqlWriter, writer::Context};

/// Writer for MySQL and MariaDB.
///
/// There is no returning clause, generated keys are read from the last insert id.
#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSqlWriter;

impl SqlWriter for MySqlSqlWriter {
    fn profile(&self) -> &'static DialectProfile {
        &MYSQL
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }
}
