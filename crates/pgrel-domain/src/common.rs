//! Database-side helpers shared by every table.

use pgrel::{OrmError, OrmResult, QueryExecutor, ident};

/// Calls functions installed in the application schema.
#[derive(Debug, Clone)]
pub struct CommonAdapter {
    executor: QueryExecutor,
    schema: String,
}

impl CommonAdapter {
    pub fn new(executor: QueryExecutor, schema: &str) -> OrmResult<Self> {
        ident::check(schema)?;
        Ok(Self {
            executor,
            schema: schema.to_string(),
        })
    }

    /// Next id from `<schema>.id_generator()`.
    pub async fn generate_uid(&self) -> OrmResult<i64> {
        let sql = format!("SELECT {}.id_generator() AS uid;", self.schema);
        let out = self.executor.query_raw(&sql, Vec::new()).await?;
        let uid = out
            .first()
            .map(|row| row.get_as::<Option<i64>>("uid"))
            .transpose()?
            .flatten()
            .ok_or_else(|| OrmError::not_found("id_generator() returned no uid"))?;
        tracing::debug!(uid, "generated uid");
        Ok(uid)
    }
}
