//! ADO-style `key=value;` connection strings.
//!
//! ```text
//! Data Source=app.db;Mode=ReadWrite;Foreign Keys=True;Default Timeout=5
//! ```
//!
//! Keys are case-insensitive and ignore inner spaces, values may be quoted with
//! `'` or `"` (a doubled quote inside a quoted value is a literal quote).
//! Parsing is purely structural; nothing is opened here.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    #[error("connection string is empty")]
    Empty,

    #[error("segment `{0}` is not a key=value pair")]
    MalformedSegment(String),

    #[error("segment has an empty key")]
    EmptyKey,

    #[error("unterminated quoted value for key `{0}`")]
    UnterminatedQuote(String),

    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("key `{0}` is given more than once")]
    DuplicateKey(String),

    #[error("invalid value `{value}` for key `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("no data source given")]
    MissingDataSource,
}

/// How the database file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenMode {
    /// Open for reading and writing, creating the file if needed
    #[default]
    ReadWriteCreate,
    /// Open for reading and writing; the file must exist
    ReadWrite,
    /// Open read-only; the file must exist
    ReadOnly,
    /// In-memory database, optionally named
    Memory,
}

/// SQLite cache sharing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CacheMode {
    #[default]
    Default,
    Private,
    Shared,
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionString {
    pub data_source: String,
    #[serde(default)]
    pub mode: OpenMode,
    #[serde(default)]
    pub cache: CacheMode,
    #[serde(default)]
    pub foreign_keys: Option<bool>,
    /// Busy timeout in seconds.
    #[serde(default)]
    pub default_timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    DataSource,
    Mode,
    Cache,
    ForeignKeys,
    DefaultTimeout,
}

impl Key {
    fn lookup(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "datasource" | "filename" => Some(Key::DataSource),
            "mode" => Some(Key::Mode),
            "cache" => Some(Key::Cache),
            "foreignkeys" => Some(Key::ForeignKeys),
            "defaulttimeout" | "commandtimeout" => Some(Key::DefaultTimeout),
            _ => None,
        }
    }
}

impl ConnectionString {
    /// Connection string for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            data_source: ":memory:".to_string(),
            mode: OpenMode::Memory,
            cache: CacheMode::Default,
            foreign_keys: None,
            default_timeout: None,
        }
    }

    /// Parse and validate a connection string.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionStringError` describing the first structural problem found.
    pub fn parse(input: &str) -> Result<Self, ConnectionStringError> {
        if input.trim().is_empty() {
            return Err(ConnectionStringError::Empty);
        }

        let mut data_source = None;
        let mut mode = OpenMode::default();
        let mut cache = CacheMode::default();
        let mut foreign_keys = None;
        let mut default_timeout = None;
        let mut seen = HashSet::new();

        for (raw_key, value) in split_pairs(input)? {
            let key = Key::lookup(&raw_key)
                .ok_or_else(|| ConnectionStringError::UnknownKey(raw_key.clone()))?;
            if !seen.insert(key) {
                return Err(ConnectionStringError::DuplicateKey(raw_key));
            }
            let invalid = || ConnectionStringError::InvalidValue {
                key: raw_key.clone(),
                value: value.clone(),
            };
            match key {
                Key::DataSource => data_source = Some(value.clone()),
                Key::Mode => mode = parse_mode(&value).ok_or_else(invalid)?,
                Key::Cache => cache = parse_cache(&value).ok_or_else(invalid)?,
                Key::ForeignKeys => foreign_keys = Some(parse_bool(&value).ok_or_else(invalid)?),
                Key::DefaultTimeout => {
                    default_timeout = Some(value.parse::<u64>().map_err(|_| invalid())?);
                }
            }
        }

        let parsed = Self {
            data_source: data_source.unwrap_or_default(),
            mode,
            cache,
            foreign_keys,
            default_timeout,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check the rules a parsed string must satisfy, for values built by hand
    /// or loaded through serde.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionStringError::MissingDataSource` when a file-backed
    /// mode has no data source.
    pub fn validate(&self) -> Result<(), ConnectionStringError> {
        if self.data_source.trim().is_empty() && self.mode != OpenMode::Memory {
            return Err(ConnectionStringError::MissingDataSource);
        }
        Ok(())
    }

    /// True when the database lives only in memory.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.mode == OpenMode::Memory || self.data_source == ":memory:"
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Option<Duration> {
        self.default_timeout.map(Duration::from_secs)
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data Source=\"{}\"", self.data_source.replace('"', "\"\""))?;
        if self.mode != OpenMode::default() {
            write!(f, ";Mode={:?}", self.mode)?;
        }
        if self.cache != CacheMode::default() {
            write!(f, ";Cache={:?}", self.cache)?;
        }
        if let Some(fk) = self.foreign_keys {
            write!(f, ";Foreign Keys={fk}")?;
        }
        if let Some(secs) = self.default_timeout {
            write!(f, ";Default Timeout={secs}")?;
        }
        Ok(())
    }
}

fn parse_mode(value: &str) -> Option<OpenMode> {
    match value.to_ascii_lowercase().as_str() {
        "readwritecreate" => Some(OpenMode::ReadWriteCreate),
        "readwrite" => Some(OpenMode::ReadWrite),
        "readonly" => Some(OpenMode::ReadOnly),
        "memory" => Some(OpenMode::Memory),
        _ => None,
    }
}

fn parse_cache(value: &str) -> Option<CacheMode> {
    match value.to_ascii_lowercase().as_str() {
        "default" => Some(CacheMode::Default),
        "private" => Some(CacheMode::Private),
        "shared" => Some(CacheMode::Shared),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Split `input` into trimmed `(key, value)` pairs, honoring quoted values.
fn split_pairs(input: &str) -> Result<Vec<(String, String)>, ConnectionStringError> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut key = String::new();
        let mut saw_eq = false;
        for c in chars.by_ref() {
            match c {
                '=' => {
                    saw_eq = true;
                    break;
                }
                ';' => break,
                _ => key.push(c),
            }
        }
        let key = key.trim().to_string();
        if !saw_eq {
            // empty segments (";;" or a trailing ';') are allowed
            if key.is_empty() {
                continue;
            }
            return Err(ConnectionStringError::MalformedSegment(key));
        }
        if key.is_empty() {
            return Err(ConnectionStringError::EmptyKey);
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        match chars.peek().copied() {
            Some(quote @ ('\'' | '"')) => {
                chars.next();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c != quote {
                        value.push(c);
                    } else if chars.peek() == Some(&quote) {
                        chars.next();
                        value.push(quote);
                    } else {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ConnectionStringError::UnterminatedQuote(key));
                }
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                    if !c.is_whitespace() {
                        return Err(ConnectionStringError::MalformedSegment(key));
                    }
                }
            }
            _ => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                    value.push(c);
                }
                value = value.trim().to_string();
            }
        }

        pairs.push((key, value));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let cs = ConnectionString::parse(
            "Data Source=app.db;Mode=ReadWrite;Cache=Shared;Foreign Keys=True;Default Timeout=5",
        )
        .unwrap();
        assert_eq!(cs.data_source, "app.db");
        assert_eq!(cs.mode, OpenMode::ReadWrite);
        assert_eq!(cs.cache, CacheMode::Shared);
        assert_eq!(cs.foreign_keys, Some(true));
        assert_eq!(cs.busy_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn keys_are_case_and_space_insensitive() {
        let cs = ConnectionString::parse("  datasource = x.db ; FOREIGNKEYS=no ; command timeout=1;")
            .unwrap();
        assert_eq!(cs.data_source, "x.db");
        assert_eq!(cs.foreign_keys, Some(false));
        assert_eq!(cs.default_timeout, Some(1));
        assert_eq!(cs.mode, OpenMode::ReadWriteCreate);

        let cs = ConnectionString::parse("Filename=y.db").unwrap();
        assert_eq!(cs.data_source, "y.db");
    }

    #[test]
    fn quoted_values_keep_separators() {
        let cs = ConnectionString::parse("Data Source='dir;with;semis/it''s.db'; Mode=ReadOnly").unwrap();
        assert_eq!(cs.data_source, "dir;with;semis/it's.db");
        assert_eq!(cs.mode, OpenMode::ReadOnly);

        let cs = ConnectionString::parse("Data Source=\"a b.db\"").unwrap();
        assert_eq!(cs.data_source, "a b.db");
    }

    #[test]
    fn memory_mode_needs_no_data_source() {
        let cs = ConnectionString::parse("Mode=Memory").unwrap();
        assert!(cs.is_in_memory());
        assert!(ConnectionString::parse("Data Source=:memory:").unwrap().is_in_memory());
    }

    #[test]
    fn structural_errors() {
        use ConnectionStringError as E;

        assert_eq!(ConnectionString::parse("   "), Err(E::Empty));
        assert_eq!(
            ConnectionString::parse("Data Source=a.db;bogus"),
            Err(E::MalformedSegment("bogus".into()))
        );
        assert_eq!(ConnectionString::parse("=a.db"), Err(E::EmptyKey));
        assert_eq!(
            ConnectionString::parse("Data Source='a.db"),
            Err(E::UnterminatedQuote("Data Source".into()))
        );
        assert_eq!(
            ConnectionString::parse("Data Source='a.db'x"),
            Err(E::MalformedSegment("Data Source".into()))
        );
        assert_eq!(
            ConnectionString::parse("Server=localhost"),
            Err(E::UnknownKey("Server".into()))
        );
        assert_eq!(
            ConnectionString::parse("Data Source=a.db;DataSource=b.db"),
            Err(E::DuplicateKey("DataSource".into()))
        );
        assert_eq!(
            ConnectionString::parse("Data Source=a.db;Mode=sideways"),
            Err(E::InvalidValue {
                key: "Mode".into(),
                value: "sideways".into()
            })
        );
        assert!(matches!(
            ConnectionString::parse("Data Source=a.db;Default Timeout=-1"),
            Err(E::InvalidValue { .. })
        ));
        assert_eq!(ConnectionString::parse("Mode=ReadOnly"), Err(E::MissingDataSource));
        assert_eq!(ConnectionString::parse("Data Source="), Err(E::MissingDataSource));
    }

    #[test]
    fn display_reparses_to_the_same_value() {
        let original = ConnectionString::parse(
            "Data Source='q\"uote.db';Mode=ReadOnly;Cache=Private;Foreign Keys=1;Default Timeout=3",
        )
        .unwrap();
        let reparsed = ConnectionString::parse(&original.to_string()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn deserializes_from_json_config() {
        let cs: ConnectionString =
            serde_json::from_str(r#"{"data_source":"app.db","mode":"ReadOnly"}"#).unwrap();
        assert_eq!(cs.mode, OpenMode::ReadOnly);
        assert_eq!(cs.cache, CacheMode::Default);
        assert_eq!(cs.foreign_keys, None);
        assert_eq!(cs.validate(), Ok(()));

        let cs: ConnectionString = serde_json::from_str(r#"{"data_source":""}"#).unwrap();
        assert_eq!(cs.validate(), Err(ConnectionStringError::MissingDataSource));
    }
}
