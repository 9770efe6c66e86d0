//! Province, district and ward lookups.

use crate::models::{District, Province, Ward};
use pgrel::{Condition, OrmError, OrmResult, QueryExecutor, RelationalAdapter};
use std::ops::Deref;

fn require(value: &str, what: &str, table: &str) -> OrmResult<()> {
    if value.trim().is_empty() {
        return Err(OrmError::validation(format!(
            "Get {table} error: input {what} is empty"
        )));
    }
    Ok(())
}

macro_rules! geography_adapter {
    ($name:ident, $model:ty) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            base: RelationalAdapter<$model>,
        }

        impl $name {
            pub fn new(executor: QueryExecutor, schema: &str) -> OrmResult<Self> {
                Ok(Self::from_base(
                    RelationalAdapter::builder(executor).schema(schema).build()?,
                ))
            }

            pub fn from_base(base: RelationalAdapter<$model>) -> Self {
                Self { base }
            }
        }

        impl Deref for $name {
            type Target = RelationalAdapter<$model>;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }
    };
}

geography_adapter!(ProvinceAdapter, Province);
geography_adapter!(DistrictAdapter, District);
geography_adapter!(WardAdapter, Ward);

impl ProvinceAdapter {
    pub async fn get_many_by_country(&self, country_code: &str) -> OrmResult<Vec<Province>> {
        require(country_code, "country code", self.table_name())?;
        self.get_all_condition(Condition::new().and_eq("country_code", country_code))
            .await
    }

    /// The province with these codes, if any.
    pub async fn get_by_code(
        &self,
        country_code: &str,
        province_code: &str,
    ) -> OrmResult<Option<Province>> {
        self.get_one(
            Condition::new()
                .and_eq("country_code", country_code)
                .and_eq("province_code", province_code),
        )
        .await
    }
}

impl DistrictAdapter {
    pub async fn get_many_by_province(
        &self,
        country_code: &str,
        province_code: &str,
    ) -> OrmResult<Vec<District>> {
        require(country_code, "country code", self.table_name())?;
        require(province_code, "province code", self.table_name())?;
        self.get_all_condition(
            Condition::new()
                .and_eq("country_code", country_code)
                .and_eq("province_code", province_code),
        )
        .await
    }

    pub async fn get_by_code(
        &self,
        country_code: &str,
        province_code: &str,
        district_code: &str,
    ) -> OrmResult<Option<District>> {
        self.get_one(
            Condition::new()
                .and_eq("country_code", country_code)
                .and_eq("province_code", province_code)
                .and_eq("district_code", district_code),
        )
        .await
    }
}

impl WardAdapter {
    pub async fn get_many_by_district(
        &self,
        country_code: &str,
        province_code: &str,
        district_code: &str,
    ) -> OrmResult<Vec<Ward>> {
        require(country_code, "country code", self.table_name())?;
        require(province_code, "province code", self.table_name())?;
        require(district_code, "district code", self.table_name())?;
        self.get_all_condition(
            Condition::new()
                .and_eq("country_code", country_code)
                .and_eq("province_code", province_code)
                .and_eq("district_code", district_code),
        )
        .await
    }
}
