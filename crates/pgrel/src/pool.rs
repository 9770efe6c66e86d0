//! Connection pools keyed by profile name.

use crate::config::{DatabaseConfig, ProfileConfig};
use crate::error::{OrmError, OrmResult};
use crate::executor::QueryExecutor;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::collections::BTreeMap;
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a pool for one profile without TLS.
pub fn create_pool(profile: &ProfileConfig) -> OrmResult<Pool> {
    create_pool_with_tls(profile, NoTls)
}

/// Create a pool for one profile using a custom TLS connector.
///
/// The profile's query timeout becomes the server-side `statement_timeout`
/// of every connection and bounds how long the pool waits for or creates a
/// connection.
pub fn create_pool_with_tls<T>(profile: &ProfileConfig, tls: T) -> OrmResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let mut pg_config: tokio_postgres::Config = profile
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;
    pg_config.options(&format!("-c statement_timeout={}", profile.query_timeout_ms));

    let timeout = Some(profile.query_timeout_duration());
    let manager = Manager::from_config(
        pg_config,
        tls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(profile.max_size)
        .runtime(Runtime::Tokio1)
        .wait_timeout(timeout)
        .create_timeout(timeout)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))
}

#[derive(Clone)]
struct Entry {
    pool: Pool,
    schema: String,
    executor: QueryExecutor,
}

/// Pools by profile name, created once by the application and shared.
#[derive(Clone)]
pub struct PoolRegistry {
    entries: BTreeMap<String, Entry>,
    default_profile: String,
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("profiles", &self.entries.keys().collect::<Vec<_>>())
            .field("default_profile", &self.default_profile)
            .finish()
    }
}

impl PoolRegistry {
    /// One pool per configured profile.
    ///
    /// Pools connect lazily, so this does not touch the network.
    pub fn from_config(config: &DatabaseConfig) -> OrmResult<Self> {
        let mut registry = Self {
            entries: BTreeMap::new(),
            default_profile: config.default_profile.clone(),
        };
        for (name, profile) in &config.profiles {
            let pool = create_pool(profile)?;
            registry.insert(name, pool, &profile.schema);
            tracing::debug!(
                profile = %name,
                schema = %profile.schema,
                max_size = profile.max_size,
                "registered connection pool"
            );
        }
        Ok(registry)
    }

    /// Register an externally built pool.
    pub fn insert(&mut self, name: &str, pool: Pool, schema: &str) -> &mut Self {
        let executor = QueryExecutor::new(pool.clone());
        self.entries.insert(
            name.to_string(),
            Entry {
                pool,
                schema: schema.to_string(),
                executor,
            },
        );
        self
    }

    fn entry(&self, name: &str) -> OrmResult<&Entry> {
        self.entries
            .get(name)
            .ok_or_else(|| OrmError::Config(format!("unknown database profile: {name}")))
    }

    pub fn pool(&self, name: &str) -> OrmResult<&Pool> {
        self.entry(name).map(|e| &e.pool)
    }

    /// Executor bound to the named profile's pool.
    pub fn executor(&self, name: &str) -> OrmResult<QueryExecutor> {
        self.entry(name).map(|e| e.executor.clone())
    }

    /// Default schema of the named profile.
    pub fn schema(&self, name: &str) -> OrmResult<&str> {
        self.entry(name).map(|e| e.schema.as_str())
    }

    pub fn default_profile(&self) -> &str {
        &self.default_profile
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
