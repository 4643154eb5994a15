use tracing::debug;

use crate::connector::Connector;
use crate::error::{Result, SqlConnectorError};

/// Environment variable read by [`ConnectorFactory::from_default_env`].
pub const DEFAULT_CONNECTION_STRING_ENV: &str = "SQL_CONNECTOR_CONNECTION_STRING";

/// Application-scoped source of [`Connector`]s.
///
/// Holds the default connection string: set once at startup, read by every
/// [`ConnectorFactory::get_connector`] call.
///
/// ```rust
/// use sql_connector::prelude::*;
///
/// let factory = ConnectorFactory::new().with_default_connection_string("Mode=Memory");
/// let connector = factory.get_connector()?;
/// assert!(connector.is_open());
/// # Ok::<(), SqlConnectorError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectorFactory {
    default_connection_string: Option<String>,
}

impl ConnectorFactory {
    /// A factory without a default connection string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose default comes from the environment variable `var`.
    ///
    /// A missing or blank variable leaves the factory without a default.
    #[must_use]
    pub fn from_env(var: &str) -> Self {
        let default_connection_string = std::env::var(var)
            .ok()
            .filter(|value| !value.trim().is_empty());
        debug!(var, found = default_connection_string.is_some(), "read default connection string");
        Self {
            default_connection_string,
        }
    }

    /// [`ConnectorFactory::from_env`] with [`DEFAULT_CONNECTION_STRING_ENV`].
    #[must_use]
    pub fn from_default_env() -> Self {
        Self::from_env(DEFAULT_CONNECTION_STRING_ENV)
    }

    #[must_use]
    pub fn with_default_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.default_connection_string = Some(connection_string.into());
        self
    }

    pub fn set_default_connection_string(&mut self, connection_string: impl Into<String>) {
        self.default_connection_string = Some(connection_string.into());
    }

    #[must_use]
    pub fn default_connection_string(&self) -> Option<&str> {
        self.default_connection_string.as_deref()
    }

    /// Open a connector with the default connection string.
    ///
    /// # Errors
    ///
    /// Returns `SqlConnectorError::NoDefaultConnectionString` when no default is
    /// set, otherwise whatever [`Connector::open`] returns.
    pub fn get_connector(&self) -> Result<Connector> {
        let connection_string = self
            .default_connection_string
            .as_deref()
            .ok_or(SqlConnectorError::NoDefaultConnectionString)?;
        Connector::open(connection_string)
    }

    /// Open a connector with an explicit connection string, ignoring the default.
    ///
    /// # Errors
    ///
    /// See [`Connector::open`].
    pub fn get_connector_with(&self, connection_string: &str) -> Result<Connector> {
        Connector::open(connection_string)
    }
}
