use std::collections::HashSet;
use std::sync::Arc;

use rusqlite::{Connection, Statement};
use tracing::debug;

use crate::error::{Result, SqlConnectorError};
use crate::results::{ColumnAccess, ColumnIndex, ResultCursor, ResultSet};
use crate::types::{CommandKind, SqlValue};

/// Sigils SQLite accepts in front of a named parameter, in lookup order.
const PARAMETER_PREFIXES: [char; 3] = ['@', ':', '$'];

/// A named parameter bound to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: SqlValue,
}

/// One SQL text or stored-procedure invocation bound to a connector's
/// connection, with its ordered named parameters.
pub struct Command<'c> {
    connection: &'c Connection,
    kind: CommandKind,
    text: String,
    parameters: Vec<Parameter>,
}

/// Validate command text and a flat `name, value, name, value, ...` argument
/// list, returning the parameters in input order.
///
/// Checks run in a fixed order: empty text, odd argument count, empty names,
/// then repeated names.
///
/// # Errors
///
/// Returns `EmptyCommandText`, `UnmatchedParameterPair`, `InvalidParameterName`
/// or `DuplicateParameterName`.
pub fn validate_arguments(command_text: &str, args: &[SqlValue]) -> Result<Vec<Parameter>> {
    if command_text.trim().is_empty() {
        return Err(SqlConnectorError::EmptyCommandText);
    }
    if args.is_empty() {
        return Ok(Vec::new());
    }
    if args.len() % 2 != 0 {
        return Err(SqlConnectorError::UnmatchedParameterPair { count: args.len() });
    }

    let mut parameters = Vec::with_capacity(args.len() / 2);
    for (pair, chunk) in args.chunks_exact(2).enumerate() {
        let name = chunk[0]
            .as_parameter_name()
            .ok_or(SqlConnectorError::InvalidParameterName { position: pair * 2 })?;
        parameters.push(Parameter {
            name,
            value: chunk[1].clone(),
        });
    }

    let mut seen = HashSet::with_capacity(parameters.len());
    for parameter in &parameters {
        if !seen.insert(parameter.name.as_str()) {
            return Err(SqlConnectorError::DuplicateParameterName(
                parameter.name.clone(),
            ));
        }
    }

    Ok(parameters)
}

/// Shared build path for text and stored-procedure commands.
pub(crate) fn build<'c>(
    connection: Option<&'c Connection>,
    kind: CommandKind,
    command_text: &str,
    args: &[SqlValue],
) -> Result<Command<'c>> {
    let parameters = validate_arguments(command_text, args)?;
    let connection = connection.ok_or(SqlConnectorError::ConnectionClosed)?;
    debug!(
        kind = %kind,
        parameters = parameters.len(),
        "built command"
    );
    Ok(Command {
        connection,
        kind,
        text: command_text.to_string(),
        parameters,
    })
}

impl<'c> Command<'c> {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn connection(&self) -> &'c Connection {
        self.connection
    }

    /// Prepare the statement and bind every parameter by name.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Unsupported` for stored procedures,
    /// `SqlConnectorError::DuplicateParameterName` if two parameters resolve to
    /// the same placeholder, and `SqlConnectorError::Driver` if the SQL does not
    /// prepare or a parameter name is not declared by the statement.
    pub fn prepare(&self) -> Result<PreparedCommand<'c>> {
        if self.kind == CommandKind::StoredProcedure {
            return Err(SqlConnectorError::Unsupported(format!(
                "stored procedure `{}`",
                self.text
            )));
        }

        let mut stmt = self.connection.prepare(&self.text)?;
        // `a` and `@a` are distinct names but may resolve to the same placeholder
        let mut bound = HashSet::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            let index = parameter_index(&stmt, &parameter.name)?.ok_or_else(|| {
                rusqlite::Error::InvalidParameterName(parameter.name.clone())
            })?;
            if !bound.insert(index) {
                return Err(SqlConnectorError::DuplicateParameterName(
                    parameter.name.clone(),
                ));
            }
            stmt.raw_bind_parameter(index, parameter.value.to_sqlite_value())?;
        }

        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        Ok(PreparedCommand {
            stmt,
            columns: Arc::new(ColumnIndex::new(columns)),
        })
    }

    /// Execute a statement that returns no rows; yields the affected row count.
    ///
    /// # Errors
    ///
    /// See [`Command::prepare`]; execution failures are `SqlConnectorError::Driver`.
    pub fn execute_non_query(&self) -> Result<usize> {
        self.prepare()?.execute_non_query()
    }

    /// Execute a query and hand its cursor to `read`.
    ///
    /// # Errors
    ///
    /// See [`Command::prepare`]; any error returned by `read` is passed through.
    pub fn execute_reader<F, T>(&self, read: F) -> Result<T>
    where
        F: FnOnce(&mut ResultCursor<'_>) -> Result<T>,
    {
        let mut prepared = self.prepare()?;
        let mut cursor = prepared.execute_reader()?;
        read(&mut cursor)
    }

    /// Execute a query and materialize every row.
    ///
    /// # Errors
    ///
    /// See [`Command::prepare`].
    pub fn execute_query(&self) -> Result<ResultSet> {
        self.execute_reader(|cursor| cursor.collect_remaining())
    }

    /// First column of the first row, or NULL when the query yields no rows.
    ///
    /// # Errors
    ///
    /// See [`Command::prepare`].
    pub fn execute_scalar(&self) -> Result<SqlValue> {
        self.execute_reader(|cursor| {
            if cursor.columns().is_empty() {
                return Ok(SqlValue::Null);
            }
            match cursor.next_row()? {
                Some(row) => Ok(row.value_at(0)?.into_owned()),
                None => Ok(SqlValue::Null),
            }
        })
    }
}

impl std::fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A command whose statement is prepared and whose parameters are bound.
///
/// It can be executed more than once; bindings survive between runs.
pub struct PreparedCommand<'c> {
    stmt: Statement<'c>,
    columns: Arc<ColumnIndex>,
}

impl PreparedCommand<'_> {
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if execution fails.
    pub fn execute_non_query(&mut self) -> Result<usize> {
        let affected = self.stmt.raw_execute()?;
        debug!(affected, "executed non-query");
        Ok(affected)
    }

    /// Start reading rows. The cursor borrows this prepared command.
    ///
    /// # Errors
    ///
    /// Currently infallible; stepping errors surface from
    /// [`ResultCursor::next_row`].
    pub fn execute_reader(&mut self) -> Result<ResultCursor<'_>> {
        debug!(columns = self.columns.len(), "executing reader");
        Ok(ResultCursor::new(
            self.stmt.raw_query(),
            Arc::clone(&self.columns),
        ))
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }
}

/// Resolve a parameter name against the statement's declared parameters.
///
/// Names that already carry a sigil are looked up as-is; bare names are tried
/// with each of `@`, `:` and `$`.
fn parameter_index(stmt: &Statement<'_>, name: &str) -> Result<Option<usize>> {
    if name.starts_with(PARAMETER_PREFIXES) {
        return Ok(stmt.parameter_index(name)?);
    }
    for prefix in PARAMETER_PREFIXES {
        if let Some(index) = stmt.parameter_index(&format!("{prefix}{name}"))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn empty_text_is_rejected_before_arguments() {
        for text in ["", "   ", "\t\n"] {
            assert!(matches!(
                validate_arguments(text, &args!["@a"]),
                Err(SqlConnectorError::EmptyCommandText)
            ));
        }
    }

    #[test]
    fn empty_argument_list_is_valid() {
        assert!(validate_arguments("SELECT 1", &[]).unwrap().is_empty());
    }

    #[test]
    fn odd_argument_count_is_unmatched() {
        assert!(matches!(
            validate_arguments("SELECT @name", &args!["@name"]),
            Err(SqlConnectorError::UnmatchedParameterPair { count: 1 })
        ));
        assert!(matches!(
            validate_arguments("SELECT @a, @b", &args!["@a", 1, "@b"]),
            Err(SqlConnectorError::UnmatchedParameterPair { count: 3 })
        ));
    }

    #[test]
    fn blank_or_null_names_report_their_position() {
        assert!(matches!(
            validate_arguments("x", &args!["@a", 1, " ", 2]),
            Err(SqlConnectorError::InvalidParameterName { position: 2 })
        ));
        assert!(matches!(
            validate_arguments("x", &args![SqlValue::Null, 1]),
            Err(SqlConnectorError::InvalidParameterName { position: 0 })
        ));
        assert!(matches!(
            validate_arguments("x", &args!["", 1]),
            Err(SqlConnectorError::InvalidParameterName { position: 0 })
        ));
    }

    #[test]
    fn values_may_be_null_but_names_may_not_repeat() {
        let parameters = validate_arguments("x", &args!["@a", SqlValue::Null]).unwrap();
        assert_eq!(parameters[0].value, SqlValue::Null);

        assert!(matches!(
            validate_arguments("x", &args!["@a", 1, "@a", 2]),
            Err(SqlConnectorError::DuplicateParameterName(name)) if name == "@a"
        ));
    }

    #[test]
    fn pairs_keep_input_order_and_stringify_names() {
        let parameters =
            validate_arguments("x", &args!["@b", 2, "@a", "one", 10, true]).unwrap();
        let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["@b", "@a", "10"]);
        assert_eq!(parameters[1].value, SqlValue::Text("one".into()));
        assert_eq!(parameters[2].value, SqlValue::Bool(true));
    }

    #[test]
    fn closed_connection_fails_after_validation() {
        assert!(matches!(
            build(None, CommandKind::Text, "  ", &[]),
            Err(SqlConnectorError::EmptyCommandText)
        ));
        assert!(matches!(
            build(None, CommandKind::Text, "SELECT 1", &[]),
            Err(SqlConnectorError::ConnectionClosed)
        ));
    }
}
