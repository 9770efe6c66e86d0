//! Write hooks run by [`RelationalAdapter`](super::RelationalAdapter).
//!
//! Hooks run in registration order. `before_*` hooks may adjust the model
//! and contribute extra columns to the statement; the first error aborts the
//! write before any SQL is issued.

use crate::builder::ExtraColumn;
use crate::error::OrmResult;
use crate::model::Model;
use crate::record::Record;
use async_trait::async_trait;

#[async_trait]
pub trait WriteHook<M: Model>: Send + Sync {
    /// Runs after audit stamping of a new model.
    async fn before_insert(&self, _model: &mut M) -> OrmResult<Vec<ExtraColumn>> {
        Ok(Vec::new())
    }

    /// Runs before the diff against the persisted row `prior`.
    async fn before_update(&self, _model: &mut M, _prior: &Record) -> OrmResult<Vec<ExtraColumn>> {
        Ok(Vec::new())
    }

    /// Runs once the statement succeeded, with the model as written.
    async fn after_write(&self, _model: &M) -> OrmResult<()> {
        Ok(())
    }
}
