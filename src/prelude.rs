//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::args;
pub use crate::command::{Command, Parameter, PreparedCommand};
pub use crate::config::ConnectorFactory;
pub use crate::connection_string::ConnectionString;
pub use crate::connector::Connector;
pub use crate::error::SqlConnectorError;
pub use crate::results::{ColumnAccess, CursorRow, DbRow, ResultCursor, ResultSet};
pub use crate::types::{CommandKind, SqlValue};
