//! Streaming export of query results
//!
//! [`StreamingFormatter`] hands each row to a [`RecordFormatter`] as soon as
//! it is read and flushes the sink before reading the next row, so the full
//! result is never held in memory. The default formatter writes one JSON
//! object per line.

use std::io::Write;
use std::ops::ControlFlow;

use crate::connection::{Connection, RowHandler};
use crate::error::Result;
use crate::logging::{default_logger, SharedLogger};
use crate::query::run_logged;
use crate::record::Record;
use crate::types::{ColumnMetadata, Value};

/// Writes one record to a sink.
///
/// Any `FnMut(&mut dyn Write, &Record) -> Result<()>` closure is a formatter.
pub trait RecordFormatter {
    /// Write `record` to `sink`
    fn format(&mut self, sink: &mut dyn Write, record: &Record) -> Result<()>;
}

impl<F> RecordFormatter for F
where
    F: FnMut(&mut dyn Write, &Record) -> Result<()>,
{
    fn format(&mut self, sink: &mut dyn Write, record: &Record) -> Result<()> {
        self(sink, record)
    }
}

/// One JSON object per line, keys in column order
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesFormatter;

impl RecordFormatter for JsonLinesFormatter {
    fn format(&mut self, sink: &mut dyn Write, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut *sink, record)?;
        sink.write_all(b"\n")?;
        Ok(())
    }
}

/// Values joined by a delimiter, one line per record, NULL as empty text
#[derive(Debug, Clone)]
pub struct DelimitedFormatter {
    delimiter: String,
}

impl DelimitedFormatter {
    /// Formatter joining values with `delimiter`
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Pipe-delimited output
    pub fn pipe() -> Self {
        Self::new("|")
    }
}

impl RecordFormatter for DelimitedFormatter {
    fn format(&mut self, sink: &mut dyn Write, record: &Record) -> Result<()> {
        let line = record
            .values()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(&self.delimiter);
        writeln!(sink, "{}", line)?;
        Ok(())
    }
}

/// Runs a query and writes each row through a [`RecordFormatter`].
///
/// # Example
///
/// ```rust,ignore
/// let mut out = std::fs::File::create("rows.jsonl")?;
/// let written = StreamingFormatter::new().export(conn.as_mut(), "select a,b,c,d from test", &mut out)?;
/// ```
pub struct StreamingFormatter {
    formatter: Box<dyn RecordFormatter>,
    logger: SharedLogger,
}

impl Default for StreamingFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingFormatter {
    /// JSON-lines exporter with the default logger
    pub fn new() -> Self {
        Self {
            formatter: Box::new(JsonLinesFormatter),
            logger: default_logger(),
        }
    }

    /// Use a different formatter
    pub fn with_formatter(mut self, formatter: impl RecordFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Use a specific logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Run `sql` and write every row to `sink`; returns the number of rows
    /// written. Writes are synchronous, so a blocking sink blocks the query.
    pub fn export(
        &mut self,
        conn: &mut dyn Connection,
        sql: &str,
        sink: &mut dyn Write,
    ) -> Result<u64> {
        let mut handler = ExportRows {
            formatter: self.formatter.as_mut(),
            sink,
            columns: Vec::new(),
            written: 0,
        };
        run_logged(self.logger.as_ref(), conn, sql, "executing query", &mut handler)?;
        Ok(handler.written)
    }
}

struct ExportRows<'a> {
    formatter: &'a mut dyn RecordFormatter,
    sink: &'a mut dyn Write,
    columns: Vec<ColumnMetadata>,
    written: u64,
}

impl RowHandler for ExportRows<'_> {
    fn on_columns(&mut self, columns: &[ColumnMetadata]) -> Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn on_row(&mut self, values: Vec<Value>, _text: Option<String>) -> Result<ControlFlow<()>> {
        let record = Record::from_row(&self.columns, values)?;
        self.formatter.format(self.sink, &record)?;
        self.sink.flush()?;
        self.written += 1;
        Ok(ControlFlow::Continue(()))
    }
}
