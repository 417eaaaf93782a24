//! Test harness for rdbc-helpers integration tests
//!
//! Provides:
//! - `ScriptedConnection`: an in-memory driver replaying fixed rows, with a
//!   `Tracker` recording open cursors, rows read and executed SQL
//! - `MemoryLogger`: a `StatementLogger` keeping every line for assertions
//! - SQLite fixture creating the two-row `test` table

#![allow(dead_code)]

use parking_lot::Mutex;
use rdbc_helpers::prelude::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing::Level;

static INIT: Once = Once::new();

/// Initialize test logging (idempotent)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "rdbc_helpers=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Logger that keeps every message
#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Messages logged at INFO level, in order
    pub fn info_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(level, _)| *level == Level::INFO)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// All messages, in order
    pub fn all(&self) -> String {
        self.lines
            .lock()
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StatementLogger for MemoryLogger {
    fn log(&self, level: Level, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

/// Observations shared between a `ScriptedConnection` and the test
#[derive(Default)]
pub struct Tracker {
    pub open_cursors: AtomicUsize,
    pub cursors_opened: AtomicUsize,
    pub rows_read: AtomicUsize,
    pub statements: Mutex<Vec<String>>,
}

impl Tracker {
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub fn cursors_opened(&self) -> usize {
        self.cursors_opened.load(Ordering::SeqCst)
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read.load(Ordering::SeqCst)
    }
}

struct CursorGuard(Arc<Tracker>);

impl CursorGuard {
    fn open(tracker: &Arc<Tracker>) -> Self {
        tracker.open_cursors.fetch_add(1, Ordering::SeqCst);
        tracker.cursors_opened.fetch_add(1, Ordering::SeqCst);
        Self(tracker.clone())
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Connection replaying a fixed result for every query
pub struct ScriptedConnection {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<Value>>,
    pub affected: i64,
    /// Fail every query after this many rows were handed out
    pub fail_after_rows: Option<usize>,
    pub tracker: Arc<Tracker>,
}

impl ScriptedConnection {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns
                .iter()
                .enumerate()
                .map(|(i, name)| ColumnMetadata::new(*name, "", (i + 1) as u32))
                .collect(),
            rows,
            affected: 0,
            fail_after_rows: None,
            tracker: Arc::new(Tracker::default()),
        }
    }

    pub fn with_affected(mut self, affected: i64) -> Self {
        self.affected = affected;
        self
    }

    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after_rows = Some(rows);
        self
    }
}

impl Connection for ScriptedConnection {
    fn execute(&mut self, sql: &str) -> Result<i64> {
        self.tracker.statements.lock().push(sql.to_string());
        if sql.trim_start().to_ascii_lowercase().starts_with("bogus") {
            return Err(Error::query_with_sql("syntax error", sql));
        }
        Ok(self.affected)
    }

    fn query(&mut self, sql: &str, handler: &mut dyn RowHandler) -> Result<()> {
        self.tracker.statements.lock().push(sql.to_string());
        let _cursor = CursorGuard::open(&self.tracker);

        handler.on_columns(&self.columns)?;
        let text_idx = handler.text_column();
        for (idx, row) in self.rows.iter().enumerate() {
            if self.fail_after_rows == Some(idx) {
                return Err(Error::query_with_sql("connection reset", sql));
            }
            self.tracker.rows_read.fetch_add(1, Ordering::SeqCst);
            // Scripted rows have no storage; their text is the value's text
            let text = text_idx
                .and_then(|i| row.get(i))
                .filter(|v| !v.is_null())
                .map(Value::to_string);
            if handler.on_row(row.clone(), text)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn is_valid(&mut self) -> bool {
        true
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Unknown
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Driver handing out `ScriptedConnection`s for `scripted:` URLs
pub struct ScriptedDriver;

impl ConnectionFactory for ScriptedDriver {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("scripted:")
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        if config.url == "scripted:down" {
            return Err(Error::connection("connection refused"));
        }
        Ok(Box::new(ScriptedConnection::new(&["one"], vec![vec![Value::Int64(1)]])))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Unknown
    }
}

/// The two-row `test` table used across the scripted tests
pub fn test_table() -> ScriptedConnection {
    use chrono::{NaiveDate, NaiveDateTime};

    let ts = NaiveDateTime::parse_from_str("2016-07-01T23:23:23.000", "%Y-%m-%dT%H:%M:%S%.f")
        .unwrap();
    let d = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap();
    ScriptedConnection::new(
        &["a", "b", "c", "d"],
        vec![
            vec![
                Value::Int64(12345),
                Value::from("chicken"),
                Value::DateTime(ts),
                Value::Date(d),
            ],
            vec![
                Value::Int64(12346),
                Value::from("turkey"),
                Value::DateTime(ts),
                Value::Date(d),
            ],
        ],
    )
}

/// Statements creating the SQLite `test` table with two rows
pub const SQLITE_FIXTURE: &[&str] = &[
    "create table test(a integer, b varchar(15), c timestamp, d date);",
    "insert into test values(12345,'chicken','2016-07-01T23:23:23.000','2016-07-01');",
    "insert into test values(12346,'turkey','2016-07-01T23:23:23.000','2016-07-01');",
];
