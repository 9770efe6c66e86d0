//! Round trips against a live database.
//!
//! Each test skips unless `DATABASE_URL` is set. Tables are temporary and
//! live only as long as the test's connection.

use pgrel::prelude::*;
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, Model)]
#[orm(table = "note", alias = "n", default_order = "uid")]
struct Note {
    #[orm(id)]
    uid: Option<i64>,
    title: Option<String>,
    body: Option<String>,
    status: Option<i64>,
    metadata: Option<serde_json::Value>,
    created_by: Option<i64>,
    updated_by: Option<i64>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

const NOTE_DDL: &str = "CREATE TEMP TABLE note (
    uid BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    body TEXT,
    status INT NOT NULL DEFAULT 1,
    metadata JSONB,
    created_by BIGINT,
    updated_by BIGINT,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ
)";

async fn try_connect() -> Option<tokio_postgres::Client> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

async fn notes() -> Option<RelationalAdapter<Note>> {
    let client = try_connect().await?;
    client.batch_execute(NOTE_DDL).await.expect("create temp table");
    Some(
        RelationalAdapter::builder(QueryExecutor::new(client))
            .schema("pg_temp")
            .build()
            .expect("adapter"),
    )
}

fn note(title: &str) -> Note {
    Note {
        title: Some(title.to_string()),
        created_by: Some(7),
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_update_delete_round_trip() {
    let Some(notes) = notes().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut first = note("first");
    first.metadata = Some(json!({"color": "red", "pin": true}));
    let saved = notes.insert_one(first, WriteOptions::default()).await.unwrap();
    let uid = saved.uid.expect("uid assigned by the database");
    assert_eq!(saved.status, Some(1));
    assert_eq!(saved.updated_by, Some(7));
    assert_eq!(saved.created_at, saved.updated_at);

    let unchanged = notes
        .update_one(saved.clone(), UpdateOptions::default())
        .await
        .unwrap();
    assert_eq!(unchanged, saved);

    let edit = Note {
        uid: Some(uid),
        title: Some("renamed".into()),
        metadata: Some(json!({"color": "blue"})),
        ..Default::default()
    };
    let updated = notes.update_one(edit, UpdateOptions::default()).await.unwrap();
    assert_eq!(updated.title.as_deref(), Some("renamed"));
    assert_eq!(updated.metadata, Some(json!({"color": "blue", "pin": true})));
    assert!(updated.updated_at >= saved.updated_at);

    assert!(notes.exists(Condition::new().and_eq("title", "renamed")).await.unwrap());
    assert_eq!(notes.delete_by_pk(uid).await.unwrap(), 1);
    assert!(notes.get_one_by_pk(uid).await.unwrap().is_none());

    let missing = Note {
        uid: Some(uid),
        title: Some("ghost".into()),
        ..Default::default()
    };
    let err = notes.update_one(missing, UpdateOptions::default()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn pages_count_then_fetch() {
    let Some(notes) = notes().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let batch: Vec<Note> = (1..=25).map(|i| note(&format!("note {i:02}"))).collect();
    let inserted = notes.insert_many(batch, WriteOptions::default()).await.unwrap();
    assert_eq!(inserted.len(), 25);

    let page = notes
        .get_pagination(Condition::new(), &Paging::new(3, 10))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 25);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.meta.count, 5);
    assert_eq!(page.data[0].title.as_deref(), Some("note 21"));

    let past_end = notes
        .get_pagination(Condition::new(), &Paging::new(4, 10))
        .await
        .unwrap();
    assert!(past_end.data.is_empty());
    assert_eq!(past_end.meta.count, 0);

    let active = notes.get_all_active(None).await.unwrap();
    assert_eq!(active.len(), 25);
}

#[tokio::test]
async fn constraint_errors_are_classified() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    client
        .batch_execute("CREATE TEMP TABLE tag (uid BIGSERIAL PRIMARY KEY, name TEXT NOT NULL UNIQUE)")
        .await
        .unwrap();
    let executor = QueryExecutor::new(client);

    executor
        .query_raw("INSERT INTO pg_temp.tag(name) VALUES ($1)", vec!["rust".into()])
        .await
        .unwrap();
    let err = executor
        .query_raw("INSERT INTO pg_temp.tag(name) VALUES ($1)", vec!["rust".into()])
        .await
        .unwrap_err();
    match err {
        OrmError::UniqueViolation { column, .. } => assert_eq!(column.as_deref(), Some("name")),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = executor
        .query_raw("INSERT INTO pg_temp.tag(name) VALUES (NULL)", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NotNullViolation { .. }));
}
