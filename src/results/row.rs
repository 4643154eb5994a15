use std::borrow::Cow;
use std::sync::Arc;

use rusqlite::types::Value;

use super::accessor::{ColumnAccess, ColumnIndex};
use crate::error::{Result, SqlConnectorError};
use crate::types::SqlValue;

/// The row a [`ResultCursor`](super::ResultCursor) is positioned on.
///
/// It borrows the cursor, so it cannot outlive the next advance.
#[derive(Clone, Copy)]
pub struct CursorRow<'r> {
    pub(crate) row: &'r rusqlite::Row<'r>,
    pub(crate) columns: &'r Arc<ColumnIndex>,
}

impl CursorRow<'_> {
    /// Copy every column of this row into an owned [`DbRow`].
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if a value cannot be read.
    pub fn to_owned_row(&self) -> Result<DbRow> {
        let values = (0..self.columns.len())
            .map(|i| self.value_at(i).map(Cow::into_owned))
            .collect::<Result<Vec<_>>>()?;
        Ok(DbRow {
            columns: Arc::clone(self.columns),
            values,
        })
    }
}

impl std::fmt::Debug for CursorRow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorRow")
            .field("columns", &self.columns.names())
            .finish_non_exhaustive()
    }
}

impl ColumnAccess for CursorRow<'_> {
    fn columns(&self) -> &ColumnIndex {
        self.columns
    }

    fn value_at(&self, ordinal: usize) -> Result<Cow<'_, SqlValue>> {
        let value: Value = self.row.get(ordinal)?;
        Ok(Cow::Owned(SqlValue::from(value)))
    }
}

/// An owned row of a materialized [`ResultSet`](super::ResultSet).
#[derive(Debug, Clone)]
pub struct DbRow {
    columns: Arc<ColumnIndex>,
    values: Vec<SqlValue>,
}

impl DbRow {
    /// Create a row from column names and matching values.
    ///
    /// Handy for exercising code that consumes rows without a database.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::ColumnCountMismatch` unless there is exactly
    /// one value per column.
    pub fn new(column_names: Vec<String>, values: Vec<SqlValue>) -> Result<Self> {
        if column_names.len() != values.len() {
            return Err(SqlConnectorError::ColumnCountMismatch {
                columns: column_names.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            columns: Arc::new(ColumnIndex::new(column_names)),
            values,
        })
    }

    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }
}

impl ColumnAccess for DbRow {
    fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    fn value_at(&self, ordinal: usize) -> Result<Cow<'_, SqlValue>> {
        self.values
            .get(ordinal)
            .map(Cow::Borrowed)
            .ok_or_else(|| SqlConnectorError::UnknownColumn(format!("#{ordinal}")))
    }
}
