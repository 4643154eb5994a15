use std::sync::Arc;

use super::accessor::ColumnIndex;
use super::result_set::ResultSet;
use super::row::CursorRow;
use crate::error::Result;

/// Forward-only, single-pass reader over the rows of an executed query.
///
/// ```rust,no_run
/// use sql_connector::prelude::*;
///
/// # fn demo(connector: &Connector) -> Result<(), SqlConnectorError> {
/// let command = connector.text_command("SELECT id, name FROM users", &[])?;
/// let mut prepared = command.prepare()?;
/// let mut cursor = prepared.execute_reader()?;
/// while let Some(row) = cursor.next_row()? {
///     let id = row.get_i64("id")?;
///     let name = row.get_string("name")?;
///     println!("{id}: {name}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResultCursor<'s> {
    rows: rusqlite::Rows<'s>,
    columns: Arc<ColumnIndex>,
}

impl<'s> ResultCursor<'s> {
    pub(crate) fn new(rows: rusqlite::Rows<'s>, columns: Arc<ColumnIndex>) -> Self {
        Self { rows, columns }
    }

    /// Advance to the next row. Returns `None` once the rows are exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if stepping the statement fails.
    pub fn next_row(&mut self) -> Result<Option<CursorRow<'_>>> {
        let columns = &self.columns;
        Ok(self.rows.next()?.map(|row| CursorRow { row, columns }))
    }

    #[must_use]
    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    /// Drain the remaining rows into an owned [`ResultSet`].
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if stepping or reading a row fails.
    pub fn collect_remaining(&mut self) -> Result<ResultSet> {
        let mut result_set = ResultSet::with_columns(Arc::clone(&self.columns));
        while let Some(row) = self.next_row()? {
            result_set.push(row.to_owned_row()?);
        }
        Ok(result_set)
    }
}

impl std::fmt::Debug for ResultCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("columns", &self.columns.names())
            .finish_non_exhaustive()
    }
}
