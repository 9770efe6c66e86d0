//! Write hooks of the address table.

use crate::geography::{DistrictAdapter, ProvinceAdapter, WardAdapter};
use crate::models::{Address, District, Province, Ward};
use async_trait::async_trait;
use futures_util::future::{try_join, try_join3};
use pgrel::{ExtraColumn, OrmResult, Record, WriteHook};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

/// Fills the country and resolves region display names from their codes.
///
/// Province and district names are looked up from the codes unless already
/// present. A ward id resolves the ward name and back-fills missing district
/// and province codes, after which those names are resolved again.
#[derive(Debug, Clone)]
pub struct AddressCascadeHook {
    provinces: ProvinceAdapter,
    districts: DistrictAdapter,
    wards: WardAdapter,
    default_country: String,
}

impl AddressCascadeHook {
    pub fn new(
        provinces: ProvinceAdapter,
        districts: DistrictAdapter,
        wards: WardAdapter,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            provinces,
            districts,
            wards,
            default_country: default_country.into(),
        }
    }

    async fn province_of(&self, model: &Address) -> OrmResult<Option<Province>> {
        let (Some(country), Some(code)) = (&model.country_code, &model.province_code) else {
            return Ok(None);
        };
        if is_blank(&model.province_code) || !is_blank(&model.province) {
            return Ok(None);
        }
        self.provinces.get_by_code(country, code).await
    }

    async fn district_of(&self, model: &Address) -> OrmResult<Option<District>> {
        let (Some(country), Some(province), Some(code)) = (
            &model.country_code,
            &model.province_code,
            &model.district_code,
        ) else {
            return Ok(None);
        };
        if is_blank(&model.province_code)
            || is_blank(&model.district_code)
            || !is_blank(&model.district)
        {
            return Ok(None);
        }
        self.districts.get_by_code(country, province, code).await
    }

    async fn ward_of(&self, model: &Address) -> OrmResult<Option<Ward>> {
        match model.ward_id {
            Some(id) if is_blank(&model.ward) => self.wards.get_one_by_pk(id).await,
            _ => Ok(None),
        }
    }

    async fn resolve_regions(&self, model: &mut Address) -> OrmResult<()> {
        let (province, district) =
            try_join(self.province_of(model), self.district_of(model)).await?;
        apply_regions(model, province, district);
        Ok(())
    }

    /// Resolve every display name of `model` in place.
    pub async fn apply(&self, model: &mut Address) -> OrmResult<()> {
        if is_blank(&model.country_code) {
            model.country_code = Some(self.default_country.clone());
        }

        let (province, district, ward) = try_join3(
            self.province_of(model),
            self.district_of(model),
            self.ward_of(model),
        )
        .await?;
        apply_regions(model, province, district);

        let Some(ward) = ward else {
            return Ok(());
        };
        model.ward = ward.display_name;
        if is_blank(&model.district_code) {
            model.district_code = ward.district_code;
            model.district = None;
        }
        if is_blank(&model.province_code) {
            model.province_code = ward.province_code;
            model.province = None;
        }
        tracing::debug!(
            ward_id = ?model.ward_id,
            province_code = ?model.province_code,
            district_code = ?model.district_code,
            "resolved ward"
        );
        self.resolve_regions(model).await
    }
}

fn apply_regions(model: &mut Address, province: Option<Province>, district: Option<District>) {
    if let Some(province) = province {
        model.province = province.display_name;
    }
    if let Some(district) = district {
        model.district = district.display_name;
    }
}

#[async_trait]
impl WriteHook<Address> for AddressCascadeHook {
    async fn before_insert(&self, model: &mut Address) -> OrmResult<Vec<ExtraColumn>> {
        self.apply(model).await?;
        Ok(Vec::new())
    }

    async fn before_update(&self, model: &mut Address, _prior: &Record) -> OrmResult<Vec<ExtraColumn>> {
        self.apply(model).await?;
        Ok(Vec::new())
    }
}

/// On update, an address owned by a user is credited to that user when no
/// author is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerHook;

#[async_trait]
impl WriteHook<Address> for OwnerHook {
    async fn before_update(&self, model: &mut Address, _prior: &Record) -> OrmResult<Vec<ExtraColumn>> {
        if let Some(user_id) = model.user_id {
            if model.created_by.is_none() {
                model.created_by = Some(user_id);
            }
            if model.updated_by.is_none() {
                model.updated_by = Some(user_id);
            }
        }
        Ok(Vec::new())
    }
}

/// Writes `gis_geometry` from the coordinates. Registered when PostGIS is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct GisPointHook;

impl GisPointHook {
    fn point(model: &Address) -> Vec<ExtraColumn> {
        match (model.longitude, model.latitude) {
            (Some(lon), Some(lat))
                if lon.is_finite() && lat.is_finite() && lon != 0.0 && lat != 0.0 =>
            {
                vec![ExtraColumn::expr(
                    "gis_geometry",
                    format!("ST_MakePoint({lon}, {lat})"),
                )]
            }
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl WriteHook<Address> for GisPointHook {
    async fn before_insert(&self, model: &mut Address) -> OrmResult<Vec<ExtraColumn>> {
        Ok(Self::point(model))
    }

    async fn before_update(&self, model: &mut Address, _prior: &Record) -> OrmResult<Vec<ExtraColumn>> {
        Ok(Self::point(model))
    }
}
