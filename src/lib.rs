//! Synchronous convenience layer over `rusqlite`.
//!
//! A [`Connector`] owns one open connection, built from an ADO-style
//! connection string. It turns SQL text (or a stored-procedure name) plus a flat
//! `name, value, name, value, ...` argument list into a validated [`Command`],
//! and query results are read through null-aware typed getters.
//!
//! ```rust
//! use sql_connector::prelude::*;
//!
//! # fn main() -> Result<(), SqlConnectorError> {
//! let factory = ConnectorFactory::new().with_default_connection_string("Data Source=:memory:");
//! let connector = factory.get_connector()?;
//! connector.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")?;
//!
//! let insert = connector.text_command(
//!     "INSERT INTO users (name, age) VALUES (@name, @age)",
//!     &args!["@name", "alice", "@age", SqlValue::Null],
//! )?;
//! assert_eq!(insert.execute_non_query()?, 1);
//!
//! let select = connector.text_command("SELECT name, age FROM users", &[])?;
//! select.execute_reader(|cursor| {
//!     while let Some(row) = cursor.next_row()? {
//!         assert_eq!(row.get_string("name")?, "alice");
//!         assert!(row.is_null("age")?);
//!         assert_eq!(row.get_i32("age")?, 0);
//!     }
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod connection_string;
pub mod connector;
pub mod error;
pub mod prelude;
pub mod results;
pub mod types;

pub use command::{Command, Parameter, PreparedCommand, validate_arguments};
pub use config::{ConnectorFactory, DEFAULT_CONNECTION_STRING_ENV};
pub use connection_string::{CacheMode, ConnectionString, ConnectionStringError, OpenMode};
pub use connector::Connector;
pub use error::{Result, SqlConnectorError};
pub use results::{ColumnAccess, CursorRow, DbRow, FromColumn, ResultCursor, ResultSet};
pub use types::{CommandKind, SqlValue};
