//! Addresses of profiles and other subjects.

mod hook;


pub use hook::{AddressCascadeHook, GisPointHook, OwnerHook};

use crate::config::AddressSettings;
use crate::geography::{DistrictAdapter, ProvinceAdapter, WardAdapter};
use crate::models::Address;
use pgrel::{
    Condition, Model, OrmError, OrmResult, QueryExecutor, RelationalAdapter, UpdateOptions,
    WriteOptions,
};
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct AddressAdapter {
    base: RelationalAdapter<Address>,
}

impl Deref for AddressAdapter {
    type Target = RelationalAdapter<Address>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

fn subject_condition(subject_id: i64, r#type: Option<&str>) -> Condition {
    let condition = Condition::new().and_eq("subject_id", subject_id);
    match r#type {
        Some(t) if !t.trim().is_empty() => condition.and_eq("type", t),
        _ => condition,
    }
}

fn required_subject(model: &Address, operation: &str) -> OrmResult<i64> {
    model
        .subject_id
        .ok_or_else(|| OrmError::validation(format!("{operation}: empty subject_id")))
}

impl AddressAdapter {
    /// Address adapter with its own geography lookups on the same executor.
    pub fn new(executor: QueryExecutor, schema: &str, settings: &AddressSettings) -> OrmResult<Self> {
        Self::with_geography(
            executor.clone(),
            schema,
            settings,
            ProvinceAdapter::new(executor.clone(), schema)?,
            DistrictAdapter::new(executor.clone(), schema)?,
            WardAdapter::new(executor, schema)?,
        )
    }

    pub fn with_geography(
        executor: QueryExecutor,
        schema: &str,
        settings: &AddressSettings,
        provinces: ProvinceAdapter,
        districts: DistrictAdapter,
        wards: WardAdapter,
    ) -> OrmResult<Self> {
        let cascade =
            AddressCascadeHook::new(provinces, districts, wards, settings.default_country.clone());
        let mut builder = RelationalAdapter::builder(executor)
            .schema(schema)
            .hook(cascade)
            .hook(OwnerHook);
        if settings.postgis {
            builder = builder.hook(GisPointHook);
        }
        Ok(Self {
            base: builder.build()?,
        })
    }

    pub async fn get_one_by_subject(
        &self,
        subject_id: i64,
        r#type: Option<&str>,
    ) -> OrmResult<Option<Address>> {
        self.get_one(subject_condition(subject_id, r#type)).await
    }

    /// Addresses of several subjects, optionally of one type.
    pub async fn get_many_by_subject(
        &self,
        subject_ids: &[i64],
        r#type: Option<&str>,
    ) -> OrmResult<Vec<Address>> {
        if subject_ids.is_empty() {
            return Err(OrmError::validation(format!(
                "get_many_by_subject {}: empty subject id list",
                self.table_name()
            )));
        }
        tracing::info!(subjects = subject_ids.len(), kind = ?r#type, "get addresses by subjects");
        let mut condition = Condition::new().and_in("subject_id", subject_ids.iter().copied());
        if let Some(t) = r#type.filter(|t| !t.trim().is_empty()) {
            condition = condition.and_eq("type", t);
        }
        self.get_all_condition(condition).await
    }

    /// The subject's address, inserting `model` when it has none.
    pub async fn get_or_create_by_subject(&self, model: Address) -> OrmResult<Address> {
        let subject_id = required_subject(&model, "get_or_create_by_subject")?;
        match self
            .get_one_by_subject(subject_id, model.r#type.as_deref())
            .await?
        {
            Some(found) => Ok(found),
            None => {
                tracing::debug!(subject_id, "address not found, creating");
                self.insert_one(model, WriteOptions::default()).await
            }
        }
    }

    /// Update the subject's address from `model`.
    ///
    /// Fails with [`OrmError::NotFound`] when the subject has no address.
    pub async fn update_by_subject(&self, mut model: Address) -> OrmResult<Address> {
        let subject_id = required_subject(&model, "update_by_subject")?;
        let prior = self
            .get_one_by_subject(subject_id, model.r#type.as_deref())
            .await?
            .ok_or_else(|| OrmError::not_found(format!("No address for subject {subject_id}")))?;
        model.uid = prior.uid;
        self.update_one(model, UpdateOptions::default().prior(prior.to_record()))
            .await
    }

    pub async fn get_by_user(&self, user_id: i64) -> OrmResult<Option<Address>> {
        self.get_one(Condition::new().and_eq("user_id", user_id)).await
    }
}
