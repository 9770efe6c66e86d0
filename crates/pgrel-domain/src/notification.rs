//! Notifications and their search filter.

use crate::models::Notification;
use chrono::{DateTime, Utc};
use pgrel::{
    Condition, FilterParams, OrmResult, Page, Paging, QueryExecutor, RelationalAdapter,
};
use serde::Deserialize;
use std::ops::Deref;

/// Search parameters of the notification list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive prefix of the message.
    pub message: Option<String>,
    pub r#type: Option<String>,
    pub subject_id: Option<i64>,
    /// Any of these statuses; empty means every status.
    pub status: Vec<i64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterParams for NotificationFilter {
    fn filter(&self, alias: Option<&str>) -> Condition {
        let col = |name: &str| match alias {
            Some(alias) => format!("{alias}.{name}"),
            None => name.to_string(),
        };

        let mut condition = Condition::new();
        if let Some(title) = present(&self.title) {
            condition = condition.and_cmp(
                &format!("LOWER({})", col("title")),
                "LIKE",
                format!("%{}%", title.to_lowercase()),
            );
        }
        if let Some(message) = present(&self.message) {
            condition = condition.and_cmp(
                &format!("LOWER({})", col("message")),
                "LIKE",
                format!("{}%", message.to_lowercase()),
            );
        }
        if let Some(kind) = present(&self.r#type) {
            condition = condition.and_eq(&col("type"), kind);
        }
        if let Some(subject_id) = self.subject_id {
            condition = condition.and_eq(&col("subject_id"), subject_id);
        }
        if !self.status.is_empty() {
            condition = condition.and_in(&col("status"), self.status.iter().copied());
        }
        if let Some(from) = self.created_from {
            condition = condition.and_cmp(&col("created_at"), ">=", from);
        }
        if let Some(to) = self.created_to {
            condition = condition.and_cmp(&col("created_at"), "<=", to);
        }
        condition
    }
}

#[derive(Debug, Clone)]
pub struct NotificationAdapter {
    base: RelationalAdapter<Notification>,
}

impl Deref for NotificationAdapter {
    type Target = RelationalAdapter<Notification>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl NotificationAdapter {
    pub fn new(executor: QueryExecutor, schema: &str) -> OrmResult<Self> {
        Ok(Self {
            base: RelationalAdapter::builder(executor).schema(schema).build()?,
        })
    }

    /// One page of the notifications matching `params`.
    pub async fn search(
        &self,
        params: &NotificationFilter,
        paging: &Paging,
    ) -> OrmResult<Page<Notification>> {
        self.filter_pagination(params, paging).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pgrel::{MockClient, Record, Value};
    use std::sync::Arc;

    #[test]
    fn filter_binds_every_present_field() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let params = NotificationFilter {
            title: Some("Sale".into()),
            message: Some("Hello".into()),
            r#type: Some("promo".into()),
            subject_id: Some(8),
            status: vec![0, 1],
            created_from: Some(from),
            ..Default::default()
        };

        match params.filter(Some("n")) {
            Condition::Structured { clauses, args, .. } => {
                assert_eq!(
                    clauses,
                    vec![
                        "LOWER(n.title) LIKE $1",
                        "LOWER(n.message) LIKE $2",
                        "n.type = $3",
                        "n.subject_id = $4",
                        "n.status IN ($5, $6)",
                        "n.created_at >= $7",
                    ]
                );
                assert_eq!(args[0], Value::from("%sale%"));
                assert_eq!(args[1], Value::from("hello%"));
                assert_eq!(args[6], Value::Timestamp(from));
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn blank_fields_are_ignored() {
        let params = NotificationFilter {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(params.filter(None).is_empty());
    }

    #[test]
    fn filter_deserializes_from_camel_case() {
        let params: NotificationFilter = serde_json::from_value(serde_json::json!({
            "subjectId": 4,
            "status": [1],
            "createdTo": "2024-02-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(params.subject_id, Some(4));
        assert_eq!(params.status, vec![1]);
        assert!(params.created_to.is_some());
    }

    #[tokio::test]
    async fn search_counts_then_fetches_the_page() {
        let mock = Arc::new(MockClient::new());
        mock.push_rows(vec![Record::new().with("total", 12)])
            .push_rows(vec![Record::new().with("uid", 1).with("title", "Sale")]);
        let notifications =
            NotificationAdapter::new(QueryExecutor::from_arc(mock.clone()), "public").unwrap();

        let params = NotificationFilter {
            r#type: Some("promo".into()),
            ..Default::default()
        };
        let page = notifications
            .search(&params, &Paging::new(2, 5))
            .await
            .unwrap();
        assert_eq!(page.meta.total, 12);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.count, 1);
        assert_eq!(page.data[0].title.as_deref(), Some("Sale"));

        let calls = mock.calls();
        assert_eq!(
            calls[0].sql,
            "SELECT COUNT(*) AS total FROM public.notification WHERE type = $1;"
        );
        assert!(calls[1].sql.ends_with(
            "FROM public.notification WHERE type = $1 ORDER BY created_at DESC OFFSET 5 LIMIT 5;"
        ));
        assert_eq!(calls[0].args, calls[1].args);
    }
}
