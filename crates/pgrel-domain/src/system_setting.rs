//! Named system settings.
//!
//! `settings` is a JSON object; an update merges the given keys into the
//! stored object instead of replacing it.

use crate::models::SystemSetting;
use pgrel::{Condition, OrmError, OrmResult, QueryExecutor, RelationalAdapter};
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct SystemSettingAdapter {
    base: RelationalAdapter<SystemSetting>,
}

impl Deref for SystemSettingAdapter {
    type Target = RelationalAdapter<SystemSetting>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl SystemSettingAdapter {
    pub fn new(executor: QueryExecutor, schema: &str) -> OrmResult<Self> {
        Ok(Self {
            base: RelationalAdapter::builder(executor).schema(schema).build()?,
        })
    }

    pub async fn get_by_name(&self, name: &str) -> OrmResult<Option<SystemSetting>> {
        if name.trim().is_empty() {
            return Err(OrmError::validation("get_by_name: input name is empty"));
        }
        self.get_one(Condition::new().and_eq("name", name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgrel::{MockClient, Record, UpdateOptions, Value};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn settings_are_merged_on_update() {
        let mock = Arc::new(MockClient::new());
        let stored = Record::new()
            .with("uid", 1)
            .with("name", "mail")
            .with("settings", json!({"smtp": {"host": "a", "port": 25}}));
        mock.push_rows(vec![stored.clone()]);
        let settings =
            SystemSettingAdapter::new(QueryExecutor::from_arc(mock.clone()), "public").unwrap();

        let model = SystemSetting {
            uid: Some(1),
            name: Some("mail".into()),
            settings: Some(json!({"smtp": {"port": 587}})),
            ..Default::default()
        };
        settings
            .update_one(model, UpdateOptions::default().prior(stored))
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert!(call.sql.starts_with(
            "UPDATE public.system_setting SET settings = $1, updated_at = $2 WHERE uid = $3"
        ));
        assert_eq!(call.args[0], Value::from(r#"{"smtp":{"host":"a","port":587}}"#));
    }

    #[tokio::test]
    async fn get_by_name() {
        let mock = Arc::new(MockClient::new());
        mock.push_rows(vec![Record::new().with("uid", 2).with("name", "mail")]);
        let settings =
            SystemSettingAdapter::new(QueryExecutor::from_arc(mock.clone()), "public").unwrap();

        let found = settings.get_by_name("mail").await.unwrap().unwrap();
        assert_eq!(found.uid, Some(2));
        assert!(mock.sqls()[0].contains("WHERE name = $1 ORDER BY name ASC LIMIT 1"));
        assert!(settings.get_by_name("").await.unwrap_err().is_validation());
    }
}
