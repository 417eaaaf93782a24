//! Query helpers that marshal result rows into values, records and groups
//!
//! Provides:
//! - ScalarQuery: first column of the first row
//! - RowSetCollector: every row as a [`Record`]
//! - GroupedRowSetCollector: records grouped by the text of a key column
//!
//! Temporal values (dates and timestamps) are rendered as text while rows
//! are read; all other values keep the type the driver produced.

use std::ops::ControlFlow;
use std::time::Instant;

use crate::connection::{Connection, RowHandler};
use crate::error::{Error, Result};
use crate::logging::{default_logger, elapsed_secs, SharedLogger, StatementLogger};
use crate::record::{GroupMode, GroupedResult, Record};
use crate::security::redact_statement;
use crate::types::{column_index, ColumnMetadata, Value};

/// Log the redacted statement, run it, and log how long execution took
/// before the first row was handed over.
pub(crate) fn run_logged(
    logger: &dyn StatementLogger,
    conn: &mut dyn Connection,
    sql: &str,
    prefix: &str,
    handler: &mut dyn RowHandler,
) -> Result<()> {
    logger.info(&format!("{}: {}", prefix, redact_statement(sql)));
    let mut timed = TimedHandler {
        inner: handler,
        logger,
        start: Instant::now(),
        rows: 0,
    };
    conn.query(sql, &mut timed)?;
    logger.debug(&format!("query returned {} rows", timed.rows));
    Ok(())
}

struct TimedHandler<'a> {
    inner: &'a mut dyn RowHandler,
    logger: &'a dyn StatementLogger,
    start: Instant,
    rows: u64,
}

impl RowHandler for TimedHandler<'_> {
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()> {
        self.logger.info(&format!(
            "query executed {} seconds",
            elapsed_secs(self.start.elapsed())
        ));
        self.inner.on_columns(columns)
    }

    fn text_column(&self) -> Option<usize> {
        self.inner.text_column()
    }

    fn on_row(&mut self, values: Vec<Value>, text: Option<String>) -> Result<ControlFlow<()>> {
        self.rows += 1;
        self.inner.on_row(values, text)
    }
}

/// Returns the first column of the first row of a query.
#[derive(Clone)]
pub struct ScalarQuery {
    logger: SharedLogger,
}

impl Default for ScalarQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarQuery {
    /// Scalar query with the default logger
    pub fn new() -> Self {
        Self {
            logger: default_logger(),
        }
    }

    /// Use a specific logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Run `sql` and return column 1 of the first row.
    ///
    /// Dates and timestamps come back as their canonical text; every other
    /// value, including 64-bit integers, comes back unchanged. Reading stops
    /// after the first row. A query without rows fails with
    /// [`Error::EmptyResult`].
    pub fn fetch(&self, conn: &mut dyn Connection, sql: &str) -> Result<Value> {
        let mut handler = FirstValue::default();
        run_logged(self.logger.as_ref(), conn, sql, "executing query", &mut handler)?;
        handler.value.ok_or_else(|| Error::empty_result(sql))
    }
}

#[derive(Default)]
struct FirstValue {
    width: usize,
    value: Option<Value>,
}

impl RowHandler for FirstValue {
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::schema("query projects no columns"));
        }
        self.width = columns.len();
        Ok(())
    }

    fn on_row(&mut self, values: Vec<Value>, _text: Option<String>) -> Result<ControlFlow<()>> {
        if values.len() != self.width {
            return Err(Error::row_width(self.width, values.len()));
        }
        self.value = values.into_iter().next().map(Value::normalize);
        Ok(ControlFlow::Break(()))
    }
}

/// Collects every row of a query into a `Vec<Record>`.
#[derive(Clone)]
pub struct RowSetCollector {
    logger: SharedLogger,
}

impl Default for RowSetCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl RowSetCollector {
    /// Collector with the default logger
    pub fn new() -> Self {
        Self {
            logger: default_logger(),
        }
    }

    /// Use a specific logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Run `sql` and return one record per row, in the order the driver
    /// returned them. The whole result is held in memory.
    pub fn collect(&self, conn: &mut dyn Connection, sql: &str) -> Result<Vec<Record>> {
        let mut handler = Records::default();
        run_logged(self.logger.as_ref(), conn, sql, "executing query", &mut handler)?;
        Ok(handler.records)
    }
}

#[derive(Default)]
struct Records {
    columns: Vec<ColumnMetadata>,
    records: Vec<Record>,
}

impl RowHandler for Records {
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn on_row(&mut self, values: Vec<Value>, _text: Option<String>) -> Result<ControlFlow<()>> {
        self.records.push(Record::from_row(&self.columns, values)?);
        Ok(ControlFlow::Continue(()))
    }
}

/// Groups the rows of a query by the text of a key column.
///
/// # Example
///
/// ```rust,ignore
/// let by_day = GroupedRowSetCollector::new("d").collect(conn.as_mut(), "select * from test")?;
/// assert_eq!(by_day.get("2016-07-01").map(Group::len), Some(2));
/// ```
#[derive(Clone)]
pub struct GroupedRowSetCollector {
    key_column: String,
    mode: GroupMode,
    logger: SharedLogger,
}

impl GroupedRowSetCollector {
    /// Collector grouping on `key_column`, keeping every record per key
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            mode: GroupMode::default(),
            logger: default_logger(),
        }
    }

    /// Set how records sharing a key are combined
    pub fn with_mode(mut self, mode: GroupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a specific logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Key column this collector groups on
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Run `sql` and group its records.
    ///
    /// Each row is keyed by the key column's text as the database stores
    /// it, so `'2016-07-01 23:23:23'` and `'2016-07-01T23:23:23'` form two
    /// groups. Fails with [`Error::ColumnNotFound`] before reading any row
    /// when the key column is not projected.
    pub fn collect(&self, conn: &mut dyn Connection, sql: &str) -> Result<GroupedResult> {
        let mut handler = Groups {
            key_column: &self.key_column,
            key_idx: 0,
            columns: Vec::new(),
            grouped: GroupedResult::new(self.mode),
        };
        let prefix = format!("executing query in thread {:?}", std::thread::current().id());
        run_logged(self.logger.as_ref(), conn, sql, &prefix, &mut handler)?;
        Ok(handler.grouped)
    }
}

struct Groups<'a> {
    key_column: &'a str,
    key_idx: usize,
    columns: Vec<ColumnMetadata>,
    grouped: GroupedResult,
}

impl RowHandler for Groups<'_> {
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()> {
        self.key_idx = column_index(columns, self.key_column).ok_or_else(|| {
            Error::column_not_found(self.key_column, columns.iter().map(|c| c.name.as_str()))
        })?;
        self.columns = columns.to_vec();
        Ok(())
    }

    fn text_column(&self) -> Option<usize> {
        Some(self.key_idx)
    }

    fn on_row(&mut self, values: Vec<Value>, text: Option<String>) -> Result<ControlFlow<()>> {
        // The key is the stored text of the key column, not the record value.
        let record = Record::from_row(&self.columns, values)?;
        self.grouped.push(text, record);
        Ok(ControlFlow::Continue(()))
    }
}
