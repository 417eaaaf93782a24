//! # rdbc-helpers
//!
//! Small helpers over a relational database client: open a connection, run a
//! statement, and turn result rows into the shapes applications usually
//! want.
//!
//! ## Features
//!
//! - **Statement execution**: affected row counts for DML and DDL
//! - **Scalar queries**: first column of the first row
//! - **Row sets**: every row as an ordered [`Record`](record::Record)
//! - **Grouped row sets**: records grouped by the text of a key column
//! - **Streaming export**: rows written one at a time through a pluggable
//!   formatter (JSON lines by default)
//! - **Log-safe SQL**: AWS credentials in Redshift `COPY`/`UNLOAD`
//!   statements and URL passwords are redacted before logging
//!
//! Dates and timestamps are returned as canonical text; every other value
//! keeps the type the driver produced.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rdbc_helpers::prelude::*;
//!
//! let mut conn = ConnectionOpener::new().open("sqlite::memory:", "", "")?;
//! StatementExecutor::new().execute(conn.as_mut(), "create table t(a integer, d date)")?;
//! StatementExecutor::new().execute(conn.as_mut(), "insert into t values (1, '2016-07-01')")?;
//!
//! let count = ScalarQuery::new().fetch(conn.as_mut(), "select count(*) from t")?;
//! let rows = RowSetCollector::new().collect(conn.as_mut(), "select * from t")?;
//! let by_day = GroupedRowSetCollector::new("d").collect(conn.as_mut(), "select * from t")?;
//!
//! let mut out = std::io::stdout();
//! StreamingFormatter::new().export(conn.as_mut(), "select * from t", &mut out)?;
//! conn.close()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `sqlite` - SQLite support via rusqlite (default)
//! - `full` - All features enabled

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod connection;
pub mod error;
pub mod execute;
pub mod export;
pub mod logging;
pub mod query;
pub mod record;
pub mod security;
pub mod types;

// Backend implementations (conditionally compiled)
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and record types
    pub use crate::record::{Group, GroupMode, GroupedResult, Record};
    pub use crate::types::{ColumnMetadata, TemporalKind, Value};

    // Connection traits and config
    pub use crate::connection::{
        Connection, ConnectionConfig, ConnectionFactory, ConnectionOpener, DatabaseType,
        DriverRegistry, RowHandler, SensitiveString,
    };

    // Helpers
    pub use crate::execute::StatementExecutor;
    pub use crate::export::{
        DelimitedFormatter, JsonLinesFormatter, RecordFormatter, StreamingFormatter,
    };
    pub use crate::query::{GroupedRowSetCollector, RowSetCollector, ScalarQuery};

    // Logging and redaction
    pub use crate::logging::{LogConfig, SharedLogger, StatementLogger, TracingLogger};
    pub use crate::security::{redact_statement, redact_url};

    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::SqliteDriver;
}

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use record::Record;
pub use types::Value;
