//! Database client seam.
//!
//! Everything above this module talks to a [`QueryClient`]: SQL text plus
//! [`Value`] arguments in, decoded [`Record`]s out. Implementations exist for
//! `tokio_postgres::Client` and, with the `pool` feature, for
//! `deadpool_postgres` pools and pooled connections.

use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::value::Value;
use async_trait::async_trait;
use tokio_postgres::types::ToSql;

/// Rows and affected-row count of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<Record>,
    /// Rows returned, or rows affected for statements without a result set.
    pub row_count: u64,
}

impl QueryOutput {
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let row_count = rows.len() as u64;
        Self { rows, row_count }
    }

    pub fn affected(row_count: u64) -> Self {
        Self {
            rows: Vec::new(),
            row_count,
        }
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn into_first(self) -> Option<Record> {
        self.rows.into_iter().next()
    }
}

/// Something that can run a parameterized statement.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<QueryOutput>;
}

fn as_params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|a| a as &(dyn ToSql + Sync)).collect()
}

async fn run_prepared(
    client: &tokio_postgres::Client,
    stmt: &tokio_postgres::Statement,
    args: &[Value],
) -> OrmResult<QueryOutput> {
    let params = as_params(args);
    if stmt.columns().is_empty() {
        let affected = tokio_postgres::Client::execute(client, stmt, &params)
            .await
            .map_err(OrmError::from_db_error)?;
        return Ok(QueryOutput::affected(affected));
    }
    let rows = tokio_postgres::Client::query(client, stmt, &params)
        .await
        .map_err(OrmError::from_db_error)?;
    let records = rows.iter().map(Record::from_row).collect::<OrmResult<Vec<_>>>()?;
    Ok(QueryOutput::from_rows(records))
}

#[async_trait]
impl QueryClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<QueryOutput> {
        let stmt = self.prepare(sql).await.map_err(OrmError::from_db_error)?;
        run_prepared(self, &stmt, args).await
    }
}

#[cfg(feature = "pool")]
#[async_trait]
impl QueryClient for deadpool_postgres::Object {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<QueryOutput> {
        let stmt = self.prepare_cached(sql).await.map_err(OrmError::from_db_error)?;
        let client: &tokio_postgres::Client = self;
        run_prepared(client, &stmt, args).await
    }
}

#[cfg(feature = "pool")]
#[async_trait]
impl QueryClient for deadpool_postgres::Pool {
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<QueryOutput> {
        let conn = self.get().await?;
        QueryClient::query(&conn, sql, args).await
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClient;

#[cfg(any(test, feature = "test-util"))]
mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Recording client for tests.
    ///
    /// Every call is recorded as a [`Statement`](crate::param::Statement).
    /// Queued responses are returned in order; once the queue is empty each
    /// call yields an empty [`QueryOutput`].
    #[derive(Debug, Default)]
    pub struct MockClient {
        responses: Mutex<VecDeque<OrmResult<QueryOutput>>>,
        calls: Mutex<Vec<crate::param::Statement>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful response with these rows.
        pub fn push_rows(&self, rows: Vec<Record>) -> &Self {
            self.push(Ok(QueryOutput::from_rows(rows)))
        }

        /// Queue an affected-row count.
        pub fn push_affected(&self, count: u64) -> &Self {
            self.push(Ok(QueryOutput::affected(count)))
        }

        pub fn push_error(&self, err: OrmError) -> &Self {
            self.push(Err(err))
        }

        pub fn push(&self, response: OrmResult<QueryOutput>) -> &Self {
            self.responses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(response);
            self
        }

        /// Statements received so far.
        pub fn calls(&self) -> Vec<crate::param::Statement> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        /// SQL of every call, in order.
        pub fn sqls(&self) -> Vec<String> {
            self.calls().into_iter().map(|s| s.sql).collect()
        }
    }

    #[async_trait]
    impl QueryClient for MockClient {
        async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<QueryOutput> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(crate::param::Statement::new(sql, args.to_vec()));
            self.responses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Ok(QueryOutput::default()))
        }
    }
}
