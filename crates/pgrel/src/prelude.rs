//! Convenient imports for typical `pgrel` usage.
//!
//! ```ignore
//! use pgrel::prelude::*;
//! ```

pub use crate::{
    Condition, DatabaseConfig, ExtraColumn, FilterParams, Model, Order, OrmError, OrmResult, Page,
    Paging, ProfileConfig, QueryExecutor, Record, RelationOptions, RelationalAdapter, Returning,
    TableSchema, UpdateOptions, Value, WriteHook, WriteOptions,
};

pub use crate::status::{ACTIVE, DELETED, DISABLED, INACTIVE};

#[cfg(feature = "pool")]
pub use crate::PoolRegistry;
