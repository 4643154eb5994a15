use std::sync::Arc;

use super::accessor::ColumnIndex;
use super::row::DbRow;

/// A materialized query result
///
/// Rows share one column index, so name lookups are resolved the same way for
/// every row.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Arc<ColumnIndex>,
    rows: Vec<DbRow>,
}

impl ResultSet {
    pub(crate) fn with_columns(columns: Arc<ColumnIndex>) -> Self {
        Self {
            columns,
            rows: Vec::with_capacity(10),
        }
    }

    pub(crate) fn push(&mut self, row: DbRow) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    #[must_use]
    pub fn rows(&self) -> &[DbRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = DbRow;
    type IntoIter = std::vec::IntoIter<DbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a DbRow;
    type IntoIter = std::slice::Iter<'a, DbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
