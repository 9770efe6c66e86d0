//! Table models.

use chrono::{DateTime, Utc};
use pgrel::Model;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "province", alias = "pr", default_order = "name")]
pub struct Province {
    #[orm(id)]
    pub uid: Option<i64>,
    pub country_code: Option<String>,
    pub province_code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "district", alias = "di", default_order = "name")]
pub struct District {
    #[orm(id)]
    pub uid: Option<i64>,
    pub country_code: Option<String>,
    pub province_code: Option<String>,
    pub district_code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "ward", alias = "w", default_order = "name")]
pub struct Ward {
    #[orm(id)]
    pub uid: Option<i64>,
    pub country_code: Option<String>,
    pub province_code: Option<String>,
    pub district_code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A postal address attached to a subject (a profile, a shop, ...).
///
/// `province`, `district` and `ward` hold display names resolved from the
/// codes on every write; see [`AddressCascadeHook`](crate::address::AddressCascadeHook).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "address", alias = "a", default_order = "-created_at")]
pub struct Address {
    #[orm(id)]
    pub uid: Option<i64>,
    pub subject_id: Option<i64>,
    pub r#type: Option<String>,
    pub user_id: Option<i64>,
    pub country_code: Option<String>,
    pub province_code: Option<String>,
    pub province: Option<String>,
    pub district_code: Option<String>,
    pub district: Option<String>,
    pub ward_id: Option<i64>,
    pub ward: Option<String>,
    pub street: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub is_default: Option<bool>,
    pub status: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "profile", alias = "p", default_order = "-created_at")]
#[orm(ignore_on_update = "email", before_save = "normalize")]
pub struct Profile {
    #[orm(id)]
    pub uid: Option<i64>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub status: Option<i64>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Usernames and emails are stored trimmed and lowercase.
    fn normalize(&mut self, _is_new: bool) {
        for field in [&mut self.username, &mut self.email] {
            if let Some(value) = field.as_mut() {
                *value = value.trim().to_lowercase();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "notification", alias = "n", default_order = "-created_at")]
pub struct Notification {
    #[orm(id)]
    pub uid: Option<i64>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub r#type: Option<String>,
    pub subject_id: Option<i64>,
    pub status: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[serde(rename_all = "camelCase", default)]
#[orm(table = "system_setting", alias = "ss", default_order = "name")]
pub struct SystemSetting {
    #[orm(id)]
    pub uid: Option<i64>,
    pub name: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub status: Option<i64>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
