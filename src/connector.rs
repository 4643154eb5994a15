use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::command::{self, Command};
use crate::connection_string::{CacheMode, ConnectionString, OpenMode};
use crate::error::{Result, SqlConnectorError};
use crate::types::{CommandKind, SqlValue};

/// Owner of one open database connection and the source of [`Command`]s.
///
/// The connection is closed exactly once: by [`Connector::close`] or, failing
/// that, when the connector is dropped. Commands and cursors borrow the
/// connector, so it cannot be closed underneath them.
pub struct Connector {
    conn: Option<Connection>,
    connection_string: ConnectionString,
}

impl Connector {
    /// Parse `connection_string` and open a connection with it.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::InvalidConnectionString` if the string does
    /// not parse, and `SqlConnectorError::Driver` if the driver cannot open the
    /// database.
    pub fn open(connection_string: &str) -> Result<Self> {
        let parsed = ConnectionString::parse(connection_string)?;
        Self::open_with(parsed)
    }

    /// Open a connection from an already parsed connection string.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::InvalidConnectionString` if the value fails
    /// [`ConnectionString::validate`], and `SqlConnectorError::Driver` if the
    /// driver cannot open the database or rejects one of the connection settings.
    pub fn open_with(connection_string: ConnectionString) -> Result<Self> {
        connection_string.validate()?;
        let conn = open_connection(&connection_string)?;
        debug!(data_source = %connection_string.data_source, "opened connection");
        Ok(Self {
            conn: Some(conn),
            connection_string,
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    #[must_use]
    pub fn connection_string(&self) -> &ConnectionString {
        &self.connection_string
    }

    /// The underlying driver connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::ConnectionClosed` after [`Connector::close`].
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(SqlConnectorError::ConnectionClosed)
    }

    /// Build a SQL text command from a flat `name, value, ...` argument list.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCommandText`, `UnmatchedParameterPair`,
    /// `InvalidParameterName`, `DuplicateParameterName`, or `ConnectionClosed`.
    pub fn text_command(&self, sql: &str, args: &[SqlValue]) -> Result<Command<'_>> {
        command::build(self.conn.as_ref(), CommandKind::Text, sql, args)
    }

    /// Build a stored-procedure command from a flat `name, value, ...` argument list.
    ///
    /// # Errors
    ///
    /// Same as [`Connector::text_command`].
    pub fn stored_procedure_command(&self, name: &str, args: &[SqlValue]) -> Result<Command<'_>> {
        command::build(self.conn.as_ref(), CommandKind::StoredProcedure, name, args)
    }

    /// Run a batch of semicolon-separated statements without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::ConnectionClosed` or `SqlConnectorError::Driver`.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }

    /// Close the connection. Calling this again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::Driver` if the driver reports an error while
    /// closing; the handle is released either way.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        debug!(data_source = %self.connection_string.data_source, "closing connection");
        conn.close().map_err(|(_conn, err)| SqlConnectorError::Driver(err))
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close connection on drop");
        }
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("connection_string", &self.connection_string)
            .field("open", &self.is_open())
            .finish()
    }
}

fn open_flags(cs: &ConnectionString) -> OpenFlags {
    let access = match cs.mode {
        OpenMode::ReadWriteCreate | OpenMode::Memory => {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
        OpenMode::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
        OpenMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
    };
    let cache = match cs.cache {
        CacheMode::Default => OpenFlags::empty(),
        CacheMode::Private => OpenFlags::SQLITE_OPEN_PRIVATE_CACHE,
        CacheMode::Shared => OpenFlags::SQLITE_OPEN_SHARED_CACHE,
    };
    access | cache | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

fn open_connection(cs: &ConnectionString) -> Result<Connection> {
    let flags = open_flags(cs);
    let conn = if !cs.is_in_memory() {
        Connection::open_with_flags(&cs.data_source, flags)?
    } else if cs.data_source.is_empty() || cs.data_source == ":memory:" {
        Connection::open_in_memory_with_flags(flags)?
    } else {
        // a named in-memory database is visible to other connections only with Cache=Shared
        let uri = format!("file:{}?mode=memory", urlencoding::encode(&cs.data_source));
        Connection::open_with_flags(uri, flags)?
    };

    if let Some(timeout) = cs.busy_timeout() {
        conn.busy_timeout(timeout)?;
    }
    if let Some(enabled) = cs.foreign_keys {
        conn.pragma_update(None, "foreign_keys", enabled)?;
    }
    Ok(conn)
}
