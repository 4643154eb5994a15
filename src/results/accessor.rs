use std::borrow::Cow;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::{Result, SqlConnectorError};
use crate::types::SqlValue;

/// Column names of a result, with a name → ordinal lookup built once.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl ColumnIndex {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let mut by_name = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // first occurrence wins for duplicated column names
            by_name.entry(name.clone()).or_insert(i);
        }
        Self { names, by_name }
    }

    /// Resolve a column name to its ordinal.
    ///
    /// Exact matches are tried first, then a case-insensitive scan.
    #[must_use]
    pub fn ordinal(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.by_name.get(column_name) {
            return Some(idx);
        }
        self.names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A Rust type a non-null column value can be converted into.
///
/// `Default::default()` is what a getter returns for a NULL column.
pub trait FromColumn: Default + Sized {
    /// Name reported as `expected` in type mismatch errors.
    const EXPECTED: &'static str;

    /// Convert a non-null value, or `None` if the stored type does not fit.
    fn from_column(value: &SqlValue) -> Option<Self>;
}

impl FromColumn for String {
    const EXPECTED: &'static str = "TEXT";

    fn from_column(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::JSON(json) => Some(json.to_string()),
            _ => None,
        }
    }
}

impl FromColumn for i64 {
    const EXPECTED: &'static str = "INTEGER";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromColumn for i32 {
    const EXPECTED: &'static str = "INTEGER (32-bit)";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromColumn for f64 {
    const EXPECTED: &'static str = "REAL";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromColumn for f32 {
    const EXPECTED: &'static str = "REAL (32-bit)";

    #[allow(clippy::cast_possible_truncation)]
    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl FromColumn for bool {
    const EXPECTED: &'static str = "BOOLEAN";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromColumn for NaiveDateTime {
    const EXPECTED: &'static str = "TIMESTAMP";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_timestamp()
    }
}

impl FromColumn for Vec<u8> {
    const EXPECTED: &'static str = "BLOB";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_blob().map(<[u8]>::to_vec)
    }
}

impl FromColumn for JsonValue {
    const EXPECTED: &'static str = "JSON";

    fn from_column(value: &SqlValue) -> Option<Self> {
        value.as_json()
    }
}

impl FromColumn for SqlValue {
    const EXPECTED: &'static str = "any value";

    fn from_column(value: &SqlValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_column(value: &SqlValue) -> Option<Self> {
        T::from_column(value).map(Some)
    }
}

/// Null-aware, type-checked access to the columns of one row.
///
/// Every getter resolves the name first (`UnknownColumn` on a miss), then
/// returns the type's default for NULL, and only then converts
/// (`TypeMismatch` when the stored value does not fit).
pub trait ColumnAccess {
    fn columns(&self) -> &ColumnIndex;

    /// Value stored at `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if the driver cannot read the slot.
    fn value_at(&self, ordinal: usize) -> Result<Cow<'_, SqlValue>>;

    /// # Errors
    ///
    /// Returns `SqlConnectorError::UnknownColumn` if no column has this name.
    fn ordinal(&self, column_name: &str) -> Result<usize> {
        self.columns()
            .ordinal(column_name)
            .ok_or_else(|| SqlConnectorError::UnknownColumn(column_name.to_string()))
    }

    /// # Errors
    ///
    /// Returns `SqlConnectorError::UnknownColumn` if no column has this name.
    fn value(&self, column_name: &str) -> Result<Cow<'_, SqlValue>> {
        let ordinal = self.ordinal(column_name)?;
        self.value_at(ordinal)
    }

    /// Whether the named column holds NULL.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::UnknownColumn` if no column has this name.
    fn is_null(&self, column_name: &str) -> Result<bool> {
        Ok(self.value(column_name)?.is_null())
    }

    /// Read the named column as `T`.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::UnknownColumn` or `SqlConnectorError::TypeMismatch`.
    fn get<T: FromColumn>(&self, column_name: &str) -> Result<T> {
        let value = self.value(column_name)?;
        if value.is_null() {
            return Ok(T::default());
        }
        T::from_column(&value).ok_or_else(|| SqlConnectorError::TypeMismatch {
            column: column_name.to_string(),
            expected: T::EXPECTED,
            found: value.type_name(),
        })
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_string(&self, column_name: &str) -> Result<String> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_i32(&self, column_name: &str) -> Result<i32> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_i64(&self, column_name: &str) -> Result<i64> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_f32(&self, column_name: &str) -> Result<f32> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_f64(&self, column_name: &str) -> Result<f64> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_bool(&self, column_name: &str) -> Result<bool> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_datetime(&self, column_name: &str) -> Result<NaiveDateTime> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_bytes(&self, column_name: &str) -> Result<Vec<u8>> {
        self.get(column_name)
    }

    /// # Errors
    ///
    /// See [`ColumnAccess::get`].
    fn get_json(&self, column_name: &str) -> Result<JsonValue> {
        self.get(column_name)
    }
}
