use crate::{
    MySqlSqlWriter, OracleSqlWriter, PostgresSqlWriter, SqlServerSqlWriter, SqlWriter,
    SqliteSqlWriter, writer::Context,
};
use std::fmt::{self, Display};

/// How bind parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ...
    Dollar,
    /// `?`
    Question,
    /// `@p1`, `@p2`, ...
    AtP,
    /// `:1`, `:2`, ...
    Colon,
}

/// How identifiers are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `"id"`
    Double,
    /// `` `id` ``
    Backtick,
    /// `[id]`
    Bracket,
    /// `"ID"`, folded to upper case.
    DoubleUpper,
}

/// How generated values are read back from an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningStyle {
    None,
    /// ` RETURNING "id"` after the values.
    Returning,
    /// ` OUTPUT INSERTED.[id]` between the column list and VALUES.
    OutputInserted,
    /// ` RETURNING "ID" INTO :N`, the value comes back through an out parameter.
    ReturningInto,
}

/// Syntax rules of one SQL family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    pub name: &'static str,
    pub placeholder: PlaceholderStyle,
    pub quote: QuoteStyle,
    pub returning: ReturningStyle,
    pub timestamp_function: &'static str,
    pub supports_returning: bool,
    pub supports_last_insert_id: bool,
}

pub static POSTGRES: DialectProfile = DialectProfile {
    name: "postgres",
    placeholder: PlaceholderStyle::Dollar,
    quote: QuoteStyle::Double,
    returning: ReturningStyle::Returning,
    timestamp_function: "NOW()",
    supports_returning: true,
    supports_last_insert_id: false,
};

pub static MYSQL: DialectProfile = DialectProfile {
    name: "mysql",
    placeholder: PlaceholderStyle::Question,
    quote: QuoteStyle::Backtick,
    returning: ReturningStyle::None,
    timestamp_function: "NOW()",
    supports_returning: false,
    supports_last_insert_id: true,
};

pub static SQLITE: DialectProfile = DialectProfile {
    name: "sqlite",
    placeholder: PlaceholderStyle::Question,
    quote: QuoteStyle::Double,
    returning: ReturningStyle::Returning,
    timestamp_function: "CURRENT_TIMESTAMP",
    supports_returning: true,
    supports_last_insert_id: true,
};

pub static SQLSERVER: DialectProfile = DialectProfile {
    name: "sqlserver",
    placeholder: PlaceholderStyle::AtP,
    quote: QuoteStyle::Bracket,
    returning: ReturningStyle::OutputInserted,
    timestamp_function: "SYSDATETIME()",
    supports_returning: true,
    supports_last_insert_id: false,
};

pub static ORACLE: DialectProfile = DialectProfile {
    name: "oracle",
    placeholder: PlaceholderStyle::Colon,
    quote: QuoteStyle::DoubleUpper,
    returning: ReturningStyle::ReturningInto,
    timestamp_function: "SYSTIMESTAMP",
    supports_returning: true,
    supports_last_insert_id: false,
};

/// The SQL families keel renders statements for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::SqlServer,
        Dialect::Oracle,
    ];

    /// Dialect of a driver name, compared case-insensitively.
    ///
    /// Unknown names fall back to postgres.
    pub fn from_name(name: &str) -> Dialect {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" | "pgx" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "sqlserver" | "mssql" => Dialect::SqlServer,
            "oracle" | "godror" | "oci8" => Dialect::Oracle,
            _ => {
                log::warn!("Unknown dialect `{name}`, falling back to postgres");
                Dialect::Postgres
            }
        }
    }

    pub fn profile(&self) -> &'static DialectProfile {
        match self {
            Dialect::Postgres => &POSTGRES,
            Dialect::MySql => &MYSQL,
            Dialect::Sqlite => &SQLITE,
            Dialect::SqlServer => &SQLSERVER,
            Dialect::Oracle => &ORACLE,
        }
    }

    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        match self {
            Dialect::Postgres => &PostgresSqlWriter,
            Dialect::MySql => &MySqlSqlWriter,
            Dialect::Sqlite => &SqliteSqlWriter,
            Dialect::SqlServer => &SqlServerSqlWriter,
            Dialect::Oracle => &OracleSqlWriter,
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

/// Quoted identifier, each segment of a dotted name is quoted separately.
///
/// ```rust
/// assert_eq!(keel_core::quote_identifier("POSTGRES", "id"), "\"id\"");
/// assert_eq!(keel_core::quote_identifier("mysql", "users.id"), "`users`.`id`");
/// ```
pub fn quote_identifier(dialect: &str, identifier: &str) -> String {
    let writer = Dialect::from_name(dialect).sql_writer();
    let mut out = String::with_capacity(identifier.len() + 4);
    writer.write_identifier(&mut Context::default(), &mut out, identifier);
    out
}

/// Placeholder of the `n`-th (1 based) bind parameter. Index 0 is treated as 1.
///
/// ```rust
/// assert_eq!(keel_core::generate_placeholder("mysql", 7), "?");
/// assert_eq!(keel_core::generate_placeholder("sqlserver", 3), "@p3");
/// ```
pub fn generate_placeholder(dialect: &str, n: u32) -> String {
    let writer = Dialect::from_name(dialect).sql_writer();
    let mut out = String::with_capacity(4);
    let mut context = Context::default();
    context.counter = n.saturating_sub(1);
    writer.write_placeholder(&mut context, &mut out);
    out
}

/// Clause reading `column` back from an INSERT, empty when the dialect has none.
///
/// ```rust
/// assert_eq!(
///     keel_core::build_returning_clause("oracle", "user_id"),
///     " RETURNING \"USER_ID\""
/// );
/// ```
pub fn build_returning_clause(dialect: &str, column: &str) -> String {
    let writer = Dialect::from_name(dialect).sql_writer();
    let mut out = String::new();
    writer.write_returning(&mut Context::default(), &mut out, column);
    out
}

/// Current timestamp expression of the dialect.
pub fn timestamp_function(dialect: &str) -> &'static str {
    Dialect::from_name(dialect).profile().timestamp_function
}
