//! Connection traits for rdbc-helpers
//!
//! Core abstractions for database connectivity:
//! - ConnectionFactory: a driver that opens connections for the URLs it accepts
//! - Connection: statement execution and scoped result cursors
//! - RowHandler: receives column metadata and rows from a cursor
//! - DriverRegistry: picks the driver for a URL
//! - ConnectionOpener: resolves a driver, opens and logs the connection

use schemars::JsonSchema;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use validator::Validate;

use crate::error::{Error, Result};
use crate::logging::{default_logger, SharedLogger};
use crate::security::redact_url;
use crate::types::{ColumnMetadata, Value};

/// Receives the rows of one query.
///
/// A driver calls [`RowHandler::on_columns`] exactly once, before any row,
/// then [`RowHandler::on_row`] for each row until rows run out or the
/// handler returns `ControlFlow::Break`. An error returned by the handler
/// aborts the query and is returned from [`Connection::query`] unchanged.
///
/// A handler that needs one column as the database's own text (a grouping
/// key, for instance) names it through [`RowHandler::text_column`]; the
/// driver reads that text straight from the stored value, independent of
/// the [`Value`] conversion.
pub trait RowHandler {
    /// Column metadata of the result, in projection order
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()>;

    /// Zero-based column whose stored text should accompany each row.
    ///
    /// Asked once, after [`RowHandler::on_columns`] succeeded.
    fn text_column(&self) -> Option<usize> {
        None
    }

    /// One row's values, in projection order, and the stored text of the
    /// [`RowHandler::text_column`] (`None` for SQL NULL or when no column
    /// was requested)
    fn on_row(&mut self, values: Vec<Value>, text: Option<String>) -> Result<ControlFlow<()>>;
}

/// A connection to a database
pub trait Connection: Send {
    /// Execute a statement that modifies data or schema.
    ///
    /// Returns the affected row count exactly as the database reports it;
    /// some databases report 0 or -1 for DDL.
    fn execute(&mut self, sql: &str) -> Result<i64>;

    /// Execute a query and feed its rows to `handler`.
    ///
    /// The result cursor lives only for the duration of this call and must
    /// be released before it returns, on success and on every error path.
    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()>;

    /// Check if connection is valid/alive
    fn is_valid(&mut self) -> bool;

    /// Database type behind this connection
    fn database_type(&self) -> DatabaseType;

    /// Close the connection
    fn close(self: Box<Self>) -> Result<()>;
}

/// A driver that opens connections
pub trait ConnectionFactory: Send + Sync {
    /// Whether this driver handles the given connection URL
    fn accepts(&self, url: &str) -> bool;

    /// Create a new connection
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>>;

    /// Get the database type
    fn database_type(&self) -> DatabaseType;
}

/// Database type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// SQLite
    SQLite,
    /// Driver registered by the application
    Unknown,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SQLite => write!(f, "SQLite"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Wrapper for sensitive configuration values
#[derive(Debug, Clone, JsonSchema)]
pub struct SensitiveString(#[schemars(with = "String")] SecretString);

impl SensitiveString {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Access the secret value
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for SensitiveString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SensitiveString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for SensitiveString {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("***REDACTED***")
    }
}

impl<'de> Deserialize<'de> for SensitiveString {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

/// Configuration for creating connections
#[derive(Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ConnectionConfig {
    /// Connection URL (e.g., `sqlite::memory:`, `postgres://host:5432/db`)
    #[validate(length(min = 1))]
    pub url: String,
    /// User name
    #[serde(default)]
    pub username: Option<String>,
    /// Password
    #[serde(default)]
    pub password: Option<SensitiveString>,
    /// Driver-specific connection properties
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &redact_url(&self.url))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("properties", &self.properties)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create configuration with just a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set user name and password
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<SensitiveString>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Add a connection property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Get a connection property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Registered drivers, consulted in registration order
#[derive(Clone)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn ConnectionFactory>>,
}

impl DriverRegistry {
    /// Registry without any drivers
    pub fn empty() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Register a driver
    pub fn register(&mut self, driver: Arc<dyn ConnectionFactory>) -> &mut Self {
        self.drivers.push(driver);
        self
    }

    /// Builder-style [`DriverRegistry::register`]
    pub fn with_driver(mut self, driver: Arc<dyn ConnectionFactory>) -> Self {
        self.drivers.push(driver);
        self
    }

    /// First driver that accepts the URL
    pub fn driver_for(&self, url: &str) -> Option<&Arc<dyn ConnectionFactory>> {
        self.drivers.iter().find(|d| d.accepts(url))
    }

    /// Number of registered drivers
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Check if no driver is registered
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl Default for DriverRegistry {
    /// Registry holding the drivers compiled into this crate
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::empty();
        #[cfg(feature = "sqlite")]
        registry.register(Arc::new(crate::sqlite::SqliteDriver));
        registry
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.drivers.iter().map(|d| d.database_type()))
            .finish()
    }
}

/// Opens connections through a [`DriverRegistry`] and logs each attempt.
///
/// # Example
///
/// ```rust,ignore
/// use rdbc_helpers::prelude::*;
///
/// let mut conn = ConnectionOpener::new().open("sqlite::memory:", "", "")?;
/// ```
#[derive(Clone)]
pub struct ConnectionOpener {
    drivers: DriverRegistry,
    logger: SharedLogger,
}

impl Default for ConnectionOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionOpener {
    /// Opener with the built-in drivers and the default logger
    pub fn new() -> Self {
        Self {
            drivers: DriverRegistry::default(),
            logger: default_logger(),
        }
    }

    /// Use a specific driver registry
    pub fn with_drivers(mut self, drivers: DriverRegistry) -> Self {
        self.drivers = drivers;
        self
    }

    /// Use a specific logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Open a connection from URL and credentials
    pub fn open(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        self.open_config(&ConnectionConfig::new(url).with_credentials(username, password))
    }

    /// Open a connection from a full configuration
    pub fn open_config(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        config
            .validate()
            .map_err(|e| Error::config(format!("invalid connection config: {}", e)))?;

        self.logger.info(&format!(
            "connecting to {} as user {}...",
            redact_url(&config.url),
            config.username.as_deref().unwrap_or("")
        ));

        let driver = self.drivers.driver_for(&config.url).ok_or_else(|| {
            Error::connection(format!("no suitable driver for {}", redact_url(&config.url)))
        })?;
        let conn = driver.connect(config)?;

        self.logger.info("connection successful!");
        Ok(conn)
    }
}
