//! Error types for rdbc-helpers
//!
//! Every helper surfaces failures immediately; nothing is retried or
//! recovered internally. The category tells callers what kind of failure
//! aborted the operation:
//! - Connection failures (driver could not open, no driver for the URL)
//! - Statement failures (malformed SQL, execution errors)
//! - Result-shape failures (empty scalar result, missing key column)
//! - Output failures (sink I/O, JSON serialization)

use std::fmt;
use thiserror::Error;

/// Result type for rdbc-helpers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Opening a connection failed
    Connection,
    /// Statement or query execution failed
    Query,
    /// A scalar query produced no rows
    EmptyResult,
    /// Result projection does not match what the caller asked for
    Schema,
    /// A value could not be converted
    TypeConversion,
    /// Invalid configuration
    Configuration,
    /// Writing to an output sink failed
    Io,
    /// Encoding a record failed
    Serialization,
}

/// Main error type for rdbc-helpers
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Statement or query execution failed
    #[error("query error: {message}")]
    Query {
        message: String,
        /// Redacted statement text
        sql: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single-value query returned zero rows
    #[error("query returned no rows: {sql}")]
    EmptyResult { sql: String },

    /// Schema error (projection mismatch)
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Requested column is not part of the result projection
    #[error("column not found: {column} (available: {available})")]
    ColumnNotFound { column: String, available: String },

    /// Type conversion failed
    #[error("type conversion error: {message}")]
    TypeConversion { message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Output sink failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Query { .. } => ErrorCategory::Query,
            Self::EmptyResult { .. } => ErrorCategory::EmptyResult,
            Self::Schema { .. } | Self::ColumnNotFound { .. } => ErrorCategory::Schema,
            Self::TypeConversion { .. } => ErrorCategory::TypeConversion,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create a query error carrying the statement text.
    ///
    /// The statement is redacted before it is stored so the error can be
    /// logged safely.
    pub fn query_with_sql(message: impl Into<String>, sql: &str) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(crate::security::redact_statement(sql)),
            source: None,
        }
    }

    /// Create a query error from a driver error
    pub fn query_with_source(
        sql: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: source.to_string(),
            sql: Some(crate::security::redact_statement(sql)),
            source: Some(Box::new(source)),
        }
    }

    /// Create an empty-result error
    pub fn empty_result(sql: &str) -> Self {
        Self::EmptyResult {
            sql: crate::security::redact_statement(sql),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a schema error for a row whose width differs from its
    /// column metadata
    pub fn row_width(columns: usize, values: usize) -> Self {
        Self::Schema {
            message: format!("row has {} values for {} columns", values, columns),
        }
    }

    /// Create a column-not-found error listing the projected columns
    pub fn column_not_found<'a>(
        column: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a type conversion error
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Redacted statement text attached to the error, if any
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Query { sql, .. } => sql.as_deref(),
            Self::EmptyResult { sql } => Some(sql),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Query => write!(f, "query"),
            Self::EmptyResult => write!(f, "empty_result"),
            Self::Schema => write!(f, "schema"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::Configuration => write!(f, "configuration"),
            Self::Io => write!(f, "io"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}
