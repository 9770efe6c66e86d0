//! # pgrel-domain
//!
//! Adapters for the application tables, built on [`pgrel`]:
//! provinces, districts and wards; addresses that resolve their region names
//! on write; profiles with unique email and username; notifications with a
//! search filter; system settings; and schema-level helpers.
//!
//! ```ignore
//! use pgrel::{DatabaseConfig, PoolRegistry};
//! use pgrel_domain::{Adapters, DomainConfig};
//!
//! let registry = PoolRegistry::from_config(&DatabaseConfig::from_env()?)?;
//! let adapters = Adapters::from_registry(&registry, "default", &DomainConfig::default())?;
//!
//! let wards = adapters.ward.get_many_by_district("VN", "79", "760").await?;
//! let address = adapters.address.get_one_by_subject(42, Some("profile")).await?;
//! ```

pub mod address;
pub mod common;
pub mod config;
pub mod geography;
pub mod models;
pub mod notification;
pub mod profile;
pub mod service;
pub mod system_setting;

pub use address::{AddressAdapter, AddressCascadeHook};
pub use common::CommonAdapter;
pub use config::{AddressSettings, DomainConfig};
pub use geography::{DistrictAdapter, ProvinceAdapter, WardAdapter};
pub use models::{Address, District, Notification, Profile, Province, SystemSetting, Ward};
pub use notification::{NotificationAdapter, NotificationFilter};
pub use profile::{ProfileAdapter, UniqueProfileHook};
pub use service::{ResponseError, ServiceResult};
pub use system_setting::SystemSettingAdapter;

use pgrel::{OrmResult, PoolRegistry, QueryExecutor};

/// Every domain adapter, sharing one executor and schema.
#[derive(Debug, Clone)]
pub struct Adapters {
    pub province: ProvinceAdapter,
    pub district: DistrictAdapter,
    pub ward: WardAdapter,
    pub address: AddressAdapter,
    pub profile: ProfileAdapter,
    pub notification: NotificationAdapter,
    pub system_setting: SystemSettingAdapter,
    pub common: CommonAdapter,
}

impl Adapters {
    pub fn new(executor: QueryExecutor, schema: &str, config: &DomainConfig) -> OrmResult<Self> {
        let province = ProvinceAdapter::new(executor.clone(), schema)?;
        let district = DistrictAdapter::new(executor.clone(), schema)?;
        let ward = WardAdapter::new(executor.clone(), schema)?;
        let address = AddressAdapter::with_geography(
            executor.clone(),
            schema,
            &config.address,
            province.clone(),
            district.clone(),
            ward.clone(),
        )?;
        Ok(Self {
            province,
            district,
            ward,
            address,
            profile: ProfileAdapter::new(executor.clone(), schema)?,
            notification: NotificationAdapter::new(executor.clone(), schema)?,
            system_setting: SystemSettingAdapter::new(executor.clone(), schema)?,
            common: CommonAdapter::new(executor, schema)?,
        })
    }

    /// Adapters on a registered profile's pool and schema.
    pub fn from_registry(
        registry: &PoolRegistry,
        profile: &str,
        config: &DomainConfig,
    ) -> OrmResult<Self> {
        Self::new(registry.executor(profile)?, registry.schema(profile)?, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgrel::MockClient;
    use std::sync::Arc;

    #[test]
    fn adapters_share_the_schema() {
        let executor = QueryExecutor::from_arc(Arc::new(MockClient::new()));
        let adapters = Adapters::new(executor, "app", &DomainConfig::default()).unwrap();
        assert_eq!(adapters.province.table_name(), "app.province");
        assert_eq!(adapters.address.table_name(), "app.address");
        assert_eq!(adapters.system_setting.table_name(), "app.system_setting");

        let executor = QueryExecutor::from_arc(Arc::new(MockClient::new()));
        assert!(Adapters::new(executor, "bad schema", &DomainConfig::default()).is_err());
    }
}
