//! User profiles.

use crate::models::Profile;
use async_trait::async_trait;
use pgrel::status::{DELETED, STATUS_COLUMN};
use pgrel::{
    Condition, ExtraColumn, Model, OrmError, OrmResult, ParamBinder, QueryExecutor, Record,
    RelationalAdapter, UpdateOptions, Value, WriteHook,
};
use std::ops::Deref;

/// Columns that must be unique among profiles that are not deleted.
pub const UNIQUE_COLUMNS: &[&str] = &["email", "username"];

/// Rejects a new profile whose email or username is already taken.
///
/// Both columns are checked with one statement. When both collide the
/// username is reported.
#[derive(Debug, Clone)]
pub struct UniqueProfileHook {
    executor: QueryExecutor,
    table: String,
}

impl UniqueProfileHook {
    pub fn new(executor: QueryExecutor, table: impl Into<String>) -> Self {
        Self {
            executor,
            table: table.into(),
        }
    }

    /// `SELECT (SELECT EXISTS (...)) AS email, ...` over the non-empty columns.
    fn statement(&self, record: &Record) -> Option<pgrel::Statement> {
        let mut binder = ParamBinder::new();
        let mut probes = Vec::new();
        for column in UNIQUE_COLUMNS {
            let value = record.value(column);
            if value.is_blank() {
                continue;
            }
            let value = binder.bind(value.clone());
            let deleted = binder.bind(DELETED);
            probes.push(format!(
                "(SELECT EXISTS (SELECT 1 FROM {} WHERE {column} = {value} AND {STATUS_COLUMN} <> {deleted})) AS {column}",
                self.table
            ));
        }
        if probes.is_empty() {
            return None;
        }
        Some(binder.finish(format!("SELECT {};", probes.join(", "))))
    }

    pub async fn check(&self, profile: &Profile) -> OrmResult<()> {
        let Some(stmt) = self.statement(&profile.to_record()) else {
            return Ok(());
        };
        let out = self.executor.execute(&stmt).await?;
        let Some(row) = out.first() else {
            return Ok(());
        };

        let mut taken = None;
        for column in UNIQUE_COLUMNS {
            if row.get_as::<Option<bool>>(column)?.unwrap_or(false) {
                taken = Some(*column);
            }
        }
        match taken {
            Some(column) => {
                tracing::info!(table = %self.table, column, "profile is not unique");
                Err(OrmError::unique_violation(
                    column,
                    format!("{column} already exists"),
                ))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WriteHook<Profile> for UniqueProfileHook {
    async fn before_insert(&self, model: &mut Profile) -> OrmResult<Vec<ExtraColumn>> {
        self.check(model).await?;
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct ProfileAdapter {
    base: RelationalAdapter<Profile>,
}

impl Deref for ProfileAdapter {
    type Target = RelationalAdapter<Profile>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

fn normalized(value: &str, what: &str) -> OrmResult<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return Err(OrmError::validation(format!("Input {what} is empty")));
    }
    Ok(value)
}

impl ProfileAdapter {
    pub fn new(executor: QueryExecutor, schema: &str) -> OrmResult<Self> {
        let table = Profile::SCHEMA.ident(schema)?.to_sql();
        let base = RelationalAdapter::builder(executor.clone())
            .schema(schema)
            .hook(UniqueProfileHook::new(executor, table))
            .build()?;
        Ok(Self { base })
    }

    pub async fn is_username_existed(&self, username: &str) -> OrmResult<bool> {
        let username = normalized(username, "username")?;
        self.exists(Condition::new().and_eq("username", username)).await
    }

    pub async fn is_email_existed(&self, email: &str) -> OrmResult<bool> {
        let email = normalized(email, "email")?;
        self.exists(Condition::new().and_eq("email", email)).await
    }

    /// Case-insensitive lookup.
    pub async fn get_by_username(&self, username: &str) -> OrmResult<Option<Profile>> {
        let username = normalized(username, "username")?;
        self.get_one(Condition::new().and_cmp("LOWER(username)", "=", username))
            .await
    }

    /// Case-insensitive lookup.
    pub async fn get_by_email(&self, email: &str) -> OrmResult<Option<Profile>> {
        let email = normalized(email, "email")?;
        self.get_one(Condition::new().and_cmp("LOWER(email)", "=", email))
            .await
    }

    pub async fn get_by_user(&self, user_id: i64) -> OrmResult<Option<Profile>> {
        self.get_one(Condition::new().and_eq("user_id", user_id)).await
    }

    /// Replace the avatar; returns the number of rows written.
    pub async fn update_avatar(&self, uid: i64, avatar: serde_json::Value) -> OrmResult<u64> {
        if avatar.is_null() {
            return Err(OrmError::validation("update_avatar: input avatar is empty"));
        }
        let changes = Record::new()
            .with("avatar", avatar)
            .with("updated_at", Value::Timestamp(chrono::Utc::now()));
        self.update_where(changes, Condition::new().and_eq("uid", uid))
            .await
    }

    /// Merge `metadata` into the stored metadata object.
    pub async fn update_metadata(&self, uid: i64, metadata: serde_json::Value) -> OrmResult<Profile> {
        let model = Profile {
            uid: Some(uid),
            metadata: Some(metadata),
            ..Default::default()
        };
        self.update_one(model, UpdateOptions::default()).await
    }
}
