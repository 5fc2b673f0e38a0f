use crate::{
    DialectProfile, EntityShape, FieldDescriptor, InsertColumns, KeyColumns, OutParam,
    PlaceholderStyle, ReturningStyle, Statement, UpdateColumns, separated_by,
    writer::{Context, Fragment},
};
use std::fmt::Write;

/// Dialect printer turning entity shapes and serialized columns into parameterized SQL.
///
/// The provided methods follow the [`DialectProfile`] of the writer, implementations override
/// the pieces their SQL family writes differently.
pub trait SqlWriter: Send + Sync {
    fn profile(&self) -> &'static DialectProfile;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote a single identifier ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Quote a possibly dotted identifier, one segment at a time.
    fn write_identifier(&self, context: &mut Context, out: &mut String, value: &str) {
        separated_by(
            out,
            value.split('.'),
            |out, v| self.write_identifier_quoted(context, out, v),
            ".",
        );
    }

    fn write_table_ref(&self, context: &mut Context, out: &mut String, shape: &EntityShape) {
        self.write_identifier(context, out, shape.table_name());
    }

    /// Render a column, qualified with its table in the SELECT list of joined entities.
    fn write_column_ref(&self, context: &mut Context, out: &mut String, field: &FieldDescriptor) {
        let qualify = context.qualify_columns
            && matches!(
                context.fragment,
                Fragment::SqlSelect | Fragment::SqlSelectWhere
            );
        if let Some(table) = field.table.filter(|_| qualify) {
            self.write_identifier_quoted(context, out, table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, field.column);
    }

    /// Render the next bind parameter.
    fn write_placeholder(&self, context: &mut Context, out: &mut String) {
        context.counter += 1;
        match self.profile().placeholder {
            PlaceholderStyle::Dollar => drop(write!(out, "${}", context.counter)),
            PlaceholderStyle::Question => out.push('?'),
            PlaceholderStyle::AtP => drop(write!(out, "@p{}", context.counter)),
            PlaceholderStyle::Colon => drop(write!(out, ":{}", context.counter)),
        }
    }

    fn write_timestamp_function(&self, _context: &mut Context, out: &mut String) {
        out.push_str(self.profile().timestamp_function);
    }

    /// Clause reading `column` back from an INSERT, nothing when the dialect has none.
    fn write_returning(&self, context: &mut Context, out: &mut String, column: &str) {
        match self.profile().returning {
            ReturningStyle::None => {}
            ReturningStyle::Returning | ReturningStyle::ReturningInto => {
                out.push_str(" RETURNING ");
                self.write_identifier(context, out, column);
            }
            ReturningStyle::OutputInserted => {
                out.push_str(" OUTPUT INSERTED.");
                self.write_identifier(context, out, column);
            }
        }
    }

    /// Terminate a statement.
    fn write_end(&self, _context: &mut Context, out: &mut String) {
        out.push(';');
    }

    /// Write `column = placeholder` pairs joined by `separator`.
    fn write_assignments(
        &self,
        context: &mut Context,
        out: &mut String,
        columns: &[String],
        separator: &str,
    ) {
        separated_by(
            out,
            columns.iter(),
            |out, v| {
                self.write_identifier(context, out, v);
                out.push_str(" = ");
                self.write_placeholder(context, out);
            },
            separator,
        );
    }

    /// Emit INSERT statement, reading the primary field back when the dialect can.
    ///
    /// The returning clause goes after the values, except for `OUTPUT INSERTED` which sits
    /// before them and `RETURNING .. INTO` which binds an extra out parameter.
    fn write_insert(&self, shape: &EntityShape, columns: &InsertColumns) -> Statement {
        let mut out = String::with_capacity(128 + columns.columns.len() * 32);
        let mut context = Context::default();
        let profile = self.profile();
        let primary = shape
            .primary_field()
            .filter(|_| profile.supports_returning);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&mut context, &mut out, shape);
        out.push_str(" (");
        separated_by(
            &mut out,
            columns.columns.iter(),
            |out, v| self.write_identifier(&mut context, out, v),
            ", ",
        );
        out.push(')');
        if let Some(primary) =
            primary.filter(|_| profile.returning == ReturningStyle::OutputInserted)
        {
            self.write_returning(&mut context, &mut out, primary.column);
        }
        out.push_str("\nVALUES (");
        separated_by(
            &mut out,
            columns.values.iter(),
            |out, _| self.write_placeholder(&mut context, out),
            ", ",
        );
        out.push(')');
        let mut out_param = None;
        if let Some(primary) =
            primary.filter(|_| profile.returning != ReturningStyle::OutputInserted)
        {
            self.write_returning(&mut context, &mut out, primary.column);
            if profile.returning == ReturningStyle::ReturningInto {
                out.push_str(" INTO ");
                self.write_placeholder(&mut context, &mut out);
                out_param = Some(OutParam {
                    position: context.counter,
                    column: primary.column.to_string(),
                    kind: primary.kind,
                });
            }
        }
        self.write_end(&mut context, &mut out);
        Statement {
            sql: out,
            params: columns.values.clone(),
            redaction_mask: columns.redaction_mask.clone(),
            returning: primary.map(|f| f.column.to_string()),
            out_param,
            table: shape.table_name(),
        }
    }

    /// Emit UPDATE statement of the given columns, targeting the row identified by `key`.
    fn write_update(
        &self,
        shape: &EntityShape,
        columns: &UpdateColumns,
        key: &KeyColumns,
    ) -> Statement {
        let mut out = String::with_capacity(128 + columns.columns.len() * 32);
        let mut context = Context::default();
        out.push_str("UPDATE ");
        self.write_table_ref(&mut context, &mut out, shape);
        out.push_str("\nSET ");
        let set = columns
            .columns
            .iter()
            .map(|v| (v, false))
            .chain(columns.auto_timestamp_columns.iter().map(|v| (v, true)));
        separated_by(
            &mut out,
            set,
            |out, (column, timestamp)| {
                self.write_identifier(&mut context, out, column);
                out.push_str(" = ");
                if timestamp {
                    self.write_timestamp_function(&mut context, out);
                } else {
                    self.write_placeholder(&mut context, out);
                }
            },
            ", ",
        );
        out.push_str("\nWHERE ");
        self.write_assignments(&mut context, &mut out, &key.columns, " AND ");
        self.write_end(&mut context, &mut out);
        let mut params = columns.values.clone();
        params.extend(key.values.iter().cloned());
        let mut redaction_mask = columns.redaction_mask.clone();
        redaction_mask.extend(key.redaction_mask.iter().map(|i| i + columns.values.len()));
        Statement {
            sql: out,
            params,
            redaction_mask,
            returning: None,
            out_param: None,
            table: shape.table_name(),
        }
    }

    /// Emit SELECT of every field, filtered on the columns of `key`.
    fn write_select_by(&self, shape: &EntityShape, key: &KeyColumns) -> Statement {
        let mut out = String::with_capacity(128 + shape.fields.len() * 32);
        let mut context = Context::new(Fragment::SqlSelect, shape.has_joined_columns);
        out.push_str("SELECT ");
        separated_by(
            &mut out,
            shape.fields.iter(),
            |out, f| self.write_column_ref(&mut context, out, f),
            ", ",
        );
        out.push_str("\nFROM ");
        self.write_table_ref(&mut context, &mut out, shape);
        out.push_str("\nWHERE ");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
            separated_by(
                &mut out,
                key.fields.iter().map(|i| &shape.fields[*i]),
                |out, f| {
                    self.write_column_ref(&mut context.current, out, f);
                    out.push_str(" = ");
                    self.write_placeholder(&mut context.current, out);
                },
                " AND ",
            );
        }
        self.write_end(&mut context, &mut out);
        Statement {
            sql: out,
            params: key.values.clone(),
            redaction_mask: key.redaction_mask.clone(),
            returning: None,
            out_param: None,
            table: shape.table_name(),
        }
    }

    /// Emit DELETE statement of the row identified by `key`.
    fn write_delete(&self, shape: &EntityShape, key: &KeyColumns) -> Statement {
        let mut out = String::with_capacity(64 + key.columns.len() * 32);
        let mut context = Context::default();
        out.push_str("DELETE FROM ");
        self.write_table_ref(&mut context, &mut out, shape);
        out.push_str("\nWHERE ");
        self.write_assignments(&mut context, &mut out, &key.columns, " AND ");
        self.write_end(&mut context, &mut out);
        Statement {
            sql: out,
            params: key.values.clone(),
            redaction_mask: key.redaction_mask.clone(),
            returning: None,
            out_param: None,
            table: shape.table_name(),
        }
    }
}
