//! SQLite backend implementation for rdbc-helpers
//!
//! Provides:
//! - `sqlite::memory:`, `sqlite:<path>` and `sqlite://<path>` URLs
//! - Mapping of storage classes and declared column types to [`Value`].
//!   SQLite has no temporal storage class, so dates and timestamps come
//!   back exactly as stored (text or integer) and are never reformatted
//! - Scoped cursors: the prepared statement and its rows never outlive a
//!   single [`Connection::query`] call

use chrono::NaiveTime;
use rusqlite::types::ValueRef;
use std::time::Duration;

use crate::connection::{Connection, ConnectionConfig, ConnectionFactory, DatabaseType, RowHandler};
use crate::error::{Error, Result};
use crate::types::{ColumnMetadata, Value};

const URL_PREFIX: &str = "sqlite:";
const MEMORY_PATH: &str = ":memory:";

/// Connection property holding the busy timeout in milliseconds
pub const BUSY_TIMEOUT_PROPERTY: &str = "busy_timeout_ms";

/// How a declared column type shapes the values read from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredKind {
    Time,
    Bool,
    Other,
}

impl DeclaredKind {
    fn from_decl(decl: &str) -> Self {
        let upper = decl.trim().to_ascii_uppercase();
        if upper.starts_with("TIME") && !upper.starts_with("TIMESTAMP") {
            Self::Time
        } else if upper.starts_with("BOOL") {
            Self::Bool
        } else {
            Self::Other
        }
    }
}

/// Extract the database path from a SQLite URL.
///
/// Returns `None` when the URL is not a SQLite URL.
pub fn database_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix(URL_PREFIX)?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    if rest.is_empty() {
        Some(MEMORY_PATH)
    } else {
        Some(rest)
    }
}

/// SQLite driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl ConnectionFactory for SqliteDriver {
    fn accepts(&self, url: &str) -> bool {
        database_path(url).is_some()
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        let path = database_path(&config.url)
            .ok_or_else(|| Error::connection(format!("not a sqlite url: {}", config.url)))?;

        let conn = if path == MEMORY_PATH {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(path)
        }
        .map_err(|e| Error::connection_with_source(format!("failed to open {}", path), e))?;

        if let Some(raw) = config.property(BUSY_TIMEOUT_PROPERTY) {
            let ms: u64 = raw.parse().map_err(|_| {
                Error::config(format!("{} must be an integer, got '{}'", BUSY_TIMEOUT_PROPERTY, raw))
            })?;
            conn.busy_timeout(Duration::from_millis(ms))
                .map_err(|e| Error::connection_with_source("failed to set busy timeout", e))?;
        }

        if config.username.as_deref().is_some_and(|u| !u.is_empty()) {
            tracing::debug!("sqlite ignores credentials for {}", path);
        }

        Ok(Box::new(SqliteConnection { conn }))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }
}

/// Connection to a SQLite database
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Wrap an already-open rusqlite connection
    pub fn from_raw(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str) -> Result<i64> {
        let affected = self
            .conn
            .execute(sql, [])
            .map_err(|e| Error::query_with_source(sql, e))?;
        i64::try_from(affected)
            .map_err(|_| Error::type_conversion(format!("affected row count {} overflows i64", affected)))
    }

    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()> {
        // The statement and its rows are dropped when this scope ends,
        // whichever way it ends.
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::query_with_source(sql, e))?;

        let columns: Vec<ColumnMetadata> = stmt
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                ColumnMetadata::new(col.name(), col.decl_type().unwrap_or(""), (i + 1) as u32)
            })
            .collect();
        let kinds: Vec<DeclaredKind> = columns
            .iter()
            .map(|c| DeclaredKind::from_decl(&c.type_name))
            .collect();

        let mut rows = stmt.query([]).map_err(|e| Error::query_with_source(sql, e))?;
        handler.on_columns(&columns)?;
        let text_idx = handler.text_column();
        if let Some(idx) = text_idx.filter(|idx| *idx >= kinds.len()) {
            return Err(Error::schema(format!(
                "text requested for column {} of {}",
                idx + 1,
                kinds.len()
            )));
        }

        while let Some(row) = rows.next().map_err(|e| Error::query_with_source(sql, e))? {
            let mut values = Vec::with_capacity(kinds.len());
            let mut text = None;
            for (idx, kind) in kinds.iter().enumerate() {
                let raw = row
                    .get_ref(idx)
                    .map_err(|e| Error::query_with_source(sql, e))?;
                if text_idx == Some(idx) {
                    text = stored_text(raw);
                }
                values.push(sqlite_value_to_value(raw, *kind));
            }
            if handler.on_row(values, text)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn is_valid(&mut self) -> bool {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::connection_with_source("failed to close connection", e))
    }
}

/// Convert a SQLite value to a rdbc-helpers Value
fn sqlite_value_to_value(raw: ValueRef<'_>, kind: DeclaredKind) -> Value {
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => match kind {
            DeclaredKind::Bool => Value::Bool(n != 0),
            _ => Value::Int64(n),
        },
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            parse_declared_text(&text, kind).unwrap_or_else(|| Value::String(text.into_owned()))
        }
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

/// The stored value as SQLite's own text conversion renders it, `None` for
/// NULL
fn stored_text(raw: ValueRef<'_>) -> Option<String> {
    match raw {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(format!("{:?}", f)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Parse text stored in a time or boolean column.
///
/// Returns `None` when the text does not fit the declared type, in which
/// case it is kept as a string.
fn parse_declared_text(text: &str, kind: DeclaredKind) -> Option<Value> {
    match kind {
        DeclaredKind::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .ok()
            .map(Value::Time),
        DeclaredKind::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Some(Value::Bool(true)),
            "false" | "f" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        DeclaredKind::Other => None,
    }
}
