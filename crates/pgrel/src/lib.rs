//! # pgrel
//!
//! Diff-based relational adapters over PostgreSQL.
//!
//! ## Features
//!
//! - **Schema-driven SQL**: column lists, WHERE, ORDER BY and LIMIT/OFFSET are
//!   derived from a static [`TableSchema`], usually produced by `#[derive(Model)]`
//! - **Bound values only**: identifiers are validated, values always travel as
//!   `$n` parameters, and every statement is checked for placeholder/argument
//!   alignment before it runs
//! - **Partial updates**: `update_one` writes only the columns that changed
//! - **Joins and pagination**: relation reads with aliased projections, and
//!   count-then-fetch pages with consistent metadata
//! - **Write hooks**: ordered `before_insert` / `before_update` / `after_write`
//!
//! ## Quick start
//!
//! ```ignore
//! use pgrel::prelude::*;
//!
//! #[derive(Debug, Clone, Model)]
//! #[orm(table = "province", alias = "pr", default_order = "name")]
//! struct Province {
//!     #[orm(id)]
//!     uid: Option<i64>,
//!     country_code: String,
//!     name: String,
//! }
//!
//! let config = DatabaseConfig::from_env()?;
//! let registry = PoolRegistry::from_config(&config)?;
//! let provinces = RelationalAdapter::<Province>::from_registry(&registry, "default")?.build()?;
//!
//! let rows = provinces
//!     .get_all_condition(Condition::new().and_eq("country_code", "VN"))
//!     .await?;
//! ```

pub mod adapter;
pub mod builder;
pub mod clause;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod executor;
pub mod ident;
pub mod model;
pub mod param;
pub mod prelude;
pub mod projector;
pub mod record;
pub mod status;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

pub use adapter::{
    AdapterBuilder, FilterParams, JoinSpec, Page, PageMeta, Relation, RelationOptions,
    RelationProvider, RelationalAdapter, StaticRelations, UpdateOptions, WriteHook, WriteOptions,
};
pub use builder::{ExtraColumn, ExtraValue, Returning, SqlBuilder};
pub use clause::{Condition, Order, PageWindow, Paging};
pub use client::{QueryClient, QueryOutput};
pub use config::{DatabaseConfig, ProfileConfig};
pub use diff::DiffOptions;
pub use error::{OrmError, OrmResult};
pub use executor::QueryExecutor;
pub use ident::Ident;
pub use model::{Model, Projection, TableSchema};
pub use param::{ParamBinder, Statement};
pub use record::Record;
pub use value::{FromValue, Value};

#[cfg(feature = "pool")]
pub use pool::{PoolRegistry, create_pool, create_pool_with_tls};

#[cfg(any(test, feature = "test-util"))]
pub use client::MockClient;

#[cfg(feature = "derive")]
pub use pgrel_derive::Model;
