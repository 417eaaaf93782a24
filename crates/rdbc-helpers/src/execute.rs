//! Statement execution for INSERT/UPDATE/DELETE and DDL

use std::time::Instant;

use crate::connection::Connection;
use crate::error::Result;
use crate::logging::{default_logger, elapsed_secs, SharedLogger};
use crate::security::redact_statement;

/// Runs data-modification statements and reports the affected row count.
///
/// # Example
///
/// ```rust,ignore
/// let inserted = StatementExecutor::new()
///     .execute(conn.as_mut(), "insert into test values (1, 'chicken')")?;
/// ```
#[derive(Clone)]
pub struct StatementExecutor {
    logger: SharedLogger,
}

impl Default for StatementExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExecutor {
    /// Executor with the default logger
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

    /// Execute `sql` and return the affected row count as reported by the
    /// driver. Failures are returned as-is; nothing is retried.
    pub fn execute(&self, conn: &mut dyn Connection, sql: &str) -> Result<i64> {
        self.logger
            .info(&format!("executing statement: {}", redact_statement(sql)));
        let start = Instant::now();

        let affected = conn.execute(sql)?;

        self.logger.info(&format!(
            "statement executed in {} seconds",
            elapsed_secs(start.elapsed())
        ));
        Ok(affected)
    }
}
