//! Statement execution with logging and a single transient retry.

use crate::client::{QueryClient, QueryOutput};
use crate::error::OrmResult;
use crate::param::{Statement, render_args};
use std::sync::Arc;
use std::time::Instant;

const SQL_LOG_LIMIT: usize = 200;

/// Cut `sql` to at most `max_bytes`, on a char boundary.
pub(crate) fn truncate_sql(sql: &str, max_bytes: usize) -> String {
    if sql.len() <= max_bytes {
        return sql.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}

/// Runs statements through a shared [`QueryClient`].
///
/// A statement that fails with [`OrmError::TransientNetwork`](crate::OrmError::TransientNetwork)
/// is re-issued once, immediately. Every other failure is returned with the
/// SQL and arguments attached.
#[derive(Clone)]
pub struct QueryExecutor {
    client: Arc<dyn QueryClient>,
    max_sql_length: Option<usize>,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("max_sql_length", &self.max_sql_length)
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    pub fn new(client: impl QueryClient + 'static) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<dyn QueryClient>) -> Self {
        Self {
            client,
            max_sql_length: Some(SQL_LOG_LIMIT),
        }
    }

    /// Log full SQL instead of a truncated prefix.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn log_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) => truncate_sql(sql, max),
            None => sql.to_string(),
        }
    }

    /// Validate, log and run `stmt`.
    pub async fn execute(&self, stmt: &Statement) -> OrmResult<QueryOutput> {
        stmt.validate()?;
        tracing::debug!(
            target: "pgrel.sql",
            sql = %self.log_sql(&stmt.sql),
            param_count = stmt.args.len(),
            "executing statement"
        );

        let start = Instant::now();
        let result = match self.client.query(&stmt.sql, &stmt.args).await {
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    target: "pgrel.sql",
                    error = %err,
                    "transient network failure, retrying once"
                );
                self.client.query(&stmt.sql, &stmt.args).await
            }
            other => other,
        };

        match result {
            Ok(output) => {
                tracing::debug!(
                    target: "pgrel.sql",
                    row_count = output.row_count,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "statement finished"
                );
                Ok(output)
            }
            Err(err) => {
                let args = render_args(&stmt.args);
                tracing::error!(
                    target: "pgrel.sql",
                    error = %err,
                    sql = %self.log_sql(&stmt.sql),
                    args = %args,
                    "statement failed"
                );
                Err(err.with_statement(&stmt.sql, args))
            }
        }
    }

    /// Run caller-written SQL through the same path.
    pub async fn query_raw(&self, sql: &str, args: Vec<crate::Value>) -> OrmResult<QueryOutput> {
        self.execute(&Statement::new(sql, args)).await
    }
}
