use crate::{Redacted, Value, ValueKind, truncate_long};
use std::fmt::{self, Display};

/// Output parameter receiving a generated value (oracle `RETURNING .. INTO :N`).
///
/// Executors report its value as a row labeled with `column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutParam {
    /// 1 based position of the placeholder.
    pub position: u32,
    pub column: String,
    pub kind: ValueKind,
}

/// Parameterized SQL ready to be handed to an [`crate::Executor`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    /// Bind parameters, in placeholder order.
    pub params: Vec<Value>,
    /// Positions in `params` that must not be logged.
    pub redaction_mask: Vec<usize>,
    /// Column read back from an INSERT through a returning clause.
    pub returning: Option<String>,
    pub out_param: Option<OutParam>,
    pub table: &'static str,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
    /// Parameters with the sensitive ones masked, for logging.
    pub fn redacted_params(&self) -> Redacted<'_> {
        Redacted::new(&self.params, &self.redaction_mask)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            write!(f, " {}", self.redacted_params())?;
        }
        Ok(())
    }
}
