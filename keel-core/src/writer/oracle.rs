use crate::{DialectProfile, ORACLE, SqlWriter, writer::Context};

/// Writer for Oracle Database.
///
/// Quoted identifiers are case sensitive in Oracle, they are folded to upper case to match
/// the names of unquoted DDL. Statements are not terminated, the drivers reject a trailing `;`.
#[derive(Default, Debug, Clone, Copy)]
pub struct OracleSqlWriter;

impl SqlWriter for OracleSqlWriter {
    fn profile(&self) -> &'static DialectProfile {
        &ORACLE
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, &value.to_uppercase(), '"', "\"\"");
        out.push('"');
    }

    fn write_end(&self, _context: &mut Context, _out: &mut String) {}
}
