//! Domain settings.
//!
//! ```toml
//! [address]
//! default_country = "VN"
//! postgis = true
//! ```

use pgrel::{OrmError, OrmResult};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_COUNTRY: &str = "VN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub address: AddressSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressSettings {
    /// Country code given to addresses that carry none.
    pub default_country: String,
    /// Write a `gis_geometry` point from longitude and latitude.
    pub postgis: bool,
}

impl Default for AddressSettings {
    fn default() -> Self {
        Self {
            default_country: DEFAULT_COUNTRY.to_string(),
            postgis: false,
        }
    }
}

impl DomainConfig {
    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let config: DomainConfig = toml::from_str(raw)
            .map_err(|e| OrmError::Config(format!("failed to parse config: {e}")))?;
        if config.address.default_country.trim().is_empty() {
            return Err(OrmError::Config(
                "address.default_country must not be empty".to_string(),
            ));
        }
        Ok(config)
    }
}
