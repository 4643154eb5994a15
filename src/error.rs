use thiserror::Error;

use crate::connection_string::ConnectionStringError;

pub type Result<T, E = SqlConnectorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SqlConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(#[from] ConnectionStringError),

    #[error("No default connection string has been configured")]
    NoDefaultConnectionString,

    #[error("Command text must not be empty")]
    EmptyCommandText,

    #[error("Parameter arguments must come in name/value pairs, got {count} arguments")]
    UnmatchedParameterPair { count: usize },

    #[error("Parameter name at argument position {position} is empty")]
    InvalidParameterName { position: usize },

    #[error("Parameter name `{0}` is given more than once")]
    DuplicateParameterName(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row has {values} values for {columns} columns")]
    ColumnCountMismatch { columns: usize, values: usize },

    #[error("Column `{column}` holds {found}, which cannot be read as {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Unsupported by the sqlite driver: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Driver(#[from] rusqlite::Error),
}
