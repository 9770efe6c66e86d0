use super::*;
use crate::client::MockClient;
use crate::model::Projection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq)]
struct Profile {
    uid: Option<i64>,
    name: Option<String>,
    email: Option<String>,
    status: i64,
    metadata: Option<serde_json::Value>,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Model for Profile {
    const SCHEMA: TableSchema = TableSchema {
        schema: None,
        table: "profile",
        alias: "p",
        primary_key: "uid",
        columns: &[
            "uid",
            "name",
            "email",
            "status",
            "metadata",
            "created_by",
            "updated_by",
            "created_at",
            "updated_at",
        ],
        default_order: Some("-created_at"),
        ignore_on_save: &[],
        ignore_on_insert: &[],
        ignore_on_update: &[],
    };

    fn to_record(&self) -> Record {
        Record::new()
            .with("uid", self.uid)
            .with("name", self.name.clone())
            .with("email", self.email.clone())
            .with("status", self.status)
            .with("metadata", self.metadata.clone())
            .with("created_by", self.created_by.clone())
            .with("updated_by", self.updated_by.clone())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
    }

    fn from_record(record: &Record) -> OrmResult<Self> {
        Ok(Self {
            uid: record.get_as("uid")?,
            name: record.get_as("name")?,
            email: record.get_as("email")?,
            status: record.get_as::<Option<i64>>("status")?.unwrap_or_default(),
            metadata: record.get_as("metadata")?,
            created_by: record.get_as("created_by")?,
            updated_by: record.get_as("updated_by")?,
            created_at: record.get_as("created_at")?,
            updated_at: record.get_as("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Address;

impl Model for Address {
    const SCHEMA: TableSchema = TableSchema::new("address", "a", &["uid", "subject_id", "city"]);

    fn to_record(&self) -> Record {
        Record::new()
    }

    fn from_record(_record: &Record) -> OrmResult<Self> {
        Ok(Address)
    }
}

fn adapter(mock: &Arc<MockClient>) -> RelationalAdapter<Profile> {
    RelationalAdapter::builder(QueryExecutor::from_arc(mock.clone()))
        .build()
        .unwrap()
}

fn persisted() -> Record {
    Record::new()
        .with("uid", 7)
        .with("name", "An")
        .with("email", "an@x.io")
        .with("status", 1)
        .with("metadata", serde_json::json!({"k": 1}))
        .with("created_by", "u1")
        .with("updated_by", "u1")
        .with("created_at", Value::Null)
        .with("updated_at", Value::Null)
}

#[test]
fn builder_resolves_table_name() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    assert_eq!(a.table_name(), "public.profile");

    let b = RelationalAdapter::<Profile>::builder(QueryExecutor::from_arc(mock))
        .schema("crm")
        .build()
        .unwrap();
    assert_eq!(b.table_name(), "crm.profile");
}

#[tokio::test]
async fn insert_one_stamps_audit_columns() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    let model = Profile {
        name: Some("An".into()),
        created_by: Some("u1".into()),
        ..Default::default()
    };

    let saved = a
        .insert_one(model, WriteOptions::default().returning(Returning::None))
        .await
        .unwrap();
    assert!(saved.created_at.is_some());
    assert_eq!(saved.updated_at, saved.created_at);
    assert_eq!(saved.updated_by.as_deref(), Some("u1"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].sql,
        "INSERT INTO public.profile(name, status, created_by, updated_by, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6);"
    );
    assert_eq!(calls[0].args.len(), 6);
}

#[tokio::test]
async fn insert_one_reads_back_returning_row() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted()]);
    let a = adapter(&mock);

    let saved = a
        .insert_one(
            Profile {
                name: Some("An".into()),
                ..Default::default()
            },
            WriteOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(saved.uid, Some(7));
    assert!(mock.sqls()[0].contains("RETURNING \"uid\", \"name\""));
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl WriteHook<Profile> for Recorder {
    async fn before_insert(&self, model: &mut Profile) -> OrmResult<Vec<ExtraColumn>> {
        self.log.lock().unwrap().push(format!("{}:before_insert", self.name));
        model.email = Some(format!("{}@hook", self.name));
        Ok(vec![ExtraColumn::expr(format!("{}_at", self.name), "now()")])
    }

    async fn after_write(&self, _model: &Profile) -> OrmResult<()> {
        self.log.lock().unwrap().push(format!("{}:after_write", self.name));
        Ok(())
    }
}

#[tokio::test]
async fn hooks_run_in_registration_order() {
    let mock = Arc::new(MockClient::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let a = RelationalAdapter::<Profile>::builder(QueryExecutor::from_arc(mock.clone()))
        .hook(Recorder {
            name: "first",
            log: log.clone(),
        })
        .hook(Recorder {
            name: "second",
            log: log.clone(),
        })
        .build()
        .unwrap();

    let saved = a
        .insert_one(
            Profile {
                name: Some("An".into()),
                created_at: Some(Utc::now()),
                ..Default::default()
            },
            WriteOptions::default().returning(Returning::None),
        )
        .await
        .unwrap();

    assert_eq!(saved.email.as_deref(), Some("second@hook"));
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first:before_insert",
            "second:before_insert",
            "first:after_write",
            "second:after_write"
        ]
    );
    let sql = &mock.sqls()[0];
    assert!(sql.contains("first_at, second_at)"));
    assert!(sql.contains("now(), now())"));
}

#[tokio::test]
async fn failing_hook_aborts_before_sql() {
    struct Reject;

    #[async_trait]
    impl WriteHook<Profile> for Reject {
        async fn before_insert(&self, _model: &mut Profile) -> OrmResult<Vec<ExtraColumn>> {
            Err(OrmError::unique_violation("email", "Email already exists"))
        }
    }

    let mock = Arc::new(MockClient::new());
    let a = RelationalAdapter::<Profile>::builder(QueryExecutor::from_arc(mock.clone()))
        .hook(Reject)
        .build()
        .unwrap();
    let err = a
        .insert_one(Profile::default(), WriteOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn insert_many_binds_one_column_set() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    let stamp = Some(Utc::now());
    let models = vec![
        Profile {
            name: Some("A".into()),
            created_at: stamp,
            ..Default::default()
        },
        Profile {
            name: Some("B".into()),
            created_at: stamp,
            ..Default::default()
        },
    ];
    let saved = a
        .insert_many(models, WriteOptions::default().returning(Returning::None))
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    let call = &mock.calls()[0];
    assert_eq!(
        call.sql,
        "INSERT INTO public.profile(name, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4), ($5, $6, $7, $8);"
    );
    call.validate().unwrap();

    let err = a.insert_many(Vec::new(), WriteOptions::default()).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn insert_many_accepts_rows_with_different_empty_fields() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    let stamp = Some(Utc::now());
    let models = vec![
        Profile {
            name: Some("A".into()),
            email: Some("a@x.io".into()),
            created_at: stamp,
            ..Default::default()
        },
        Profile {
            name: Some("B".into()),
            created_at: stamp,
            ..Default::default()
        },
    ];
    let saved = a
        .insert_many(models, WriteOptions::default().returning(Returning::None))
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].email, None);

    let call = &mock.calls()[0];
    assert_eq!(
        call.sql,
        "INSERT INTO public.profile(name, email, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5), ($6, DEFAULT, $7, $8, $9);"
    );
    assert_eq!(call.args[5], Value::from("B"));
    call.validate().unwrap();
}

#[tokio::test]
async fn update_one_with_no_changes_issues_no_update() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted()]);
    let a = adapter(&mock);

    let model = Profile::from_record(&persisted()).unwrap();
    let out = a.update_one(model, UpdateOptions::default()).await.unwrap();
    assert_eq!(out.uid, Some(7));
    assert_eq!(mock.call_count(), 1);
    assert!(mock.sqls()[0].starts_with("SELECT"));
    assert!(mock.sqls()[0].ends_with("WHERE uid = $1 LIMIT 1;"));
}

#[derive(Debug, Clone, PartialEq)]
struct Tag {
    uid: Option<i64>,
    code: Option<String>,
    name: Option<String>,
}

impl Model for Tag {
    const SCHEMA: TableSchema = TableSchema {
        ignore_on_update: &["code"],
        ..TableSchema::new("tag", "t", &["uid", "code", "name"])
    };

    fn to_record(&self) -> Record {
        Record::new()
            .with("uid", self.uid)
            .with("code", self.code.clone())
            .with("name", self.name.clone())
    }

    fn from_record(record: &Record) -> OrmResult<Self> {
        Ok(Self {
            uid: record.get_as("uid")?,
            code: record.get_as("code")?,
            name: record.get_as("name")?,
        })
    }
}

#[tokio::test]
async fn update_one_ignores_columns_excluded_from_updates() {
    let mock = Arc::new(MockClient::new());
    let tags: RelationalAdapter<Tag> = RelationalAdapter::builder(QueryExecutor::from_arc(mock.clone()))
        .build()
        .unwrap();
    let prior = Record::new().with("uid", 4).with("code", "a").with("name", "x");

    let model = Tag {
        uid: Some(4),
        code: Some("b".into()),
        name: Some("x".into()),
    };
    let out = tags
        .update_one(model, UpdateOptions::default().prior(prior.clone()))
        .await
        .unwrap();
    assert_eq!(out, Tag::from_record(&prior).unwrap());
    assert_eq!(mock.call_count(), 0);

    let model = Tag {
        uid: Some(4),
        code: Some("b".into()),
        name: Some("y".into()),
    };
    mock.push_rows(vec![Record::new().with("uid", 4).with("code", "a").with("name", "y")]);
    let out = tags
        .update_one(model, UpdateOptions::default().prior(prior))
        .await
        .unwrap();
    assert_eq!(out.code.as_deref(), Some("a"));
    assert!(mock.sqls()[0].starts_with("UPDATE public.tag SET name = $1 WHERE uid = $2"));
}

#[tokio::test]
async fn update_one_writes_only_changed_columns() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted().with("name", "Binh")]);
    let a = adapter(&mock);

    let mut model = Profile::from_record(&persisted()).unwrap();
    model.name = Some("Binh".into());
    model.metadata = Some(serde_json::json!({"j": 2}));

    let out = a
        .update_one(model, UpdateOptions::default().prior(persisted()))
        .await
        .unwrap();
    assert_eq!(out.name.as_deref(), Some("Binh"));

    let call = &mock.calls()[0];
    assert!(call.sql.starts_with(
        "UPDATE public.profile SET metadata = $1, name = $2, updated_at = $3 WHERE uid = $4 RETURNING"
    ));
    assert_eq!(call.args[0], Value::from(r#"{"k":1,"j":2}"#));
    assert_eq!(call.args[1], Value::from("Binh"));
    assert_eq!(call.args[3], Value::Int(7));
}

#[tokio::test]
async fn update_one_requires_pk_and_existing_row() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);

    let err = a
        .update_one(Profile::default(), UpdateOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(mock.call_count(), 0);

    let missing = Profile {
        uid: Some(99),
        ..Default::default()
    };
    let err = a.update_one(missing, UpdateOptions::default()).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn get_or_create_skips_insert_for_existing_row() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted()]);
    let a = adapter(&mock);

    let model = Profile {
        uid: Some(7),
        ..Default::default()
    };
    let found = a.get_or_create(model).await.unwrap();
    assert_eq!(found.name.as_deref(), Some("An"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn get_or_create_inserts_once_on_miss() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![]).push_rows(vec![persisted()]);
    let a = adapter(&mock);

    let model = Profile {
        uid: Some(7),
        name: Some("An".into()),
        ..Default::default()
    };
    a.get_or_create(model).await.unwrap();
    let sqls = mock.sqls();
    assert_eq!(sqls.len(), 2);
    assert!(sqls[1].starts_with("INSERT INTO public.profile"));

    let fresh = Arc::new(MockClient::new());
    let b = adapter(&fresh);
    b.get_or_create(Profile::default()).await.unwrap();
    assert_eq!(fresh.call_count(), 1);
    assert!(fresh.sqls()[0].starts_with("INSERT"));
}

#[tokio::test]
async fn upsert_dispatches_on_primary_key() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    a.upsert_one(Profile::default(), UpdateOptions::default())
        .await
        .unwrap();
    assert!(mock.sqls()[0].starts_with("INSERT"));

    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted()]);
    let a = adapter(&mock);
    let model = Profile::from_record(&persisted()).unwrap();
    a.upsert_one(model, UpdateOptions::default()).await.unwrap();
    assert!(mock.sqls()[0].starts_with("SELECT"));
}

#[tokio::test]
async fn reads_require_conditions() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);

    assert!(a.get_one(Condition::new()).await.unwrap_err().is_validation());
    assert!(a.get_all_condition(Condition::new()).await.unwrap_err().is_validation());
    assert!(a.delete_many(Condition::new()).await.unwrap_err().is_validation());
    assert!(a.exists(Condition::raw("")).await.unwrap_err().is_validation());
    assert!(a.get_many(Vec::<i64>::new()).await.unwrap_err().is_validation());
    assert!(a.delete_by_pk(Value::Null).await.unwrap_err().is_validation());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn status_reads_and_default_order() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![persisted()]);
    let a = adapter(&mock);

    let rows = a.get_all_active(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    let call = &mock.calls()[0];
    assert!(call.sql.ends_with("FROM public.profile WHERE status = $1 ORDER BY created_at DESC;"));
    assert_eq!(call.args, vec![Value::Int(status::ACTIVE)]);

    a.get_all_order(Order::text("name")).await.unwrap();
    assert!(mock.sqls()[1].ends_with("FROM public.profile ORDER BY name ASC;"));

    assert!(RelationalAdapter::<Address>::builder(QueryExecutor::from_arc(mock.clone()))
        .build()
        .unwrap()
        .get_all_deleted(None)
        .await
        .unwrap_err()
        .is_validation());
}

#[tokio::test]
async fn exists_count_and_delete() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("exists", true)])
        .push_rows(vec![Record::new().with("total", 4)])
        .push_affected(2);
    let a = adapter(&mock);

    assert!(a.exists(Condition::new().and_eq("email", "an@x.io")).await.unwrap());
    assert_eq!(a.count(Condition::new()).await.unwrap(), 4);
    assert_eq!(a.delete_by_pk(7).await.unwrap(), 2);

    let sqls = mock.sqls();
    assert_eq!(
        sqls[0],
        "SELECT EXISTS (SELECT 1 FROM public.profile WHERE email = $1) AS exists;"
    );
    assert_eq!(sqls[1], "SELECT COUNT(*) AS total FROM public.profile;");
    assert_eq!(sqls[2], "DELETE FROM public.profile WHERE uid = $1;");
}

#[tokio::test]
async fn pagination_counts_then_fetches() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("total", 25)])
        .push_rows(vec![persisted(); 5]);
    let a = adapter(&mock);

    let page = a
        .get_pagination(Condition::new().and_eq("status", 1), &Paging::new(3, 10))
        .await
        .unwrap();
    assert_eq!(
        page.meta,
        PageMeta {
            page_size: 10,
            page_number: 3,
            total_pages: 3,
            total: 25,
            count: 5
        }
    );
    let calls = mock.calls();
    assert_eq!(calls[0].args, calls[1].args);
    assert!(calls[1].sql.ends_with("ORDER BY created_at DESC OFFSET 20 LIMIT 10;"));
}

#[tokio::test]
async fn pagination_past_the_end_skips_fetch() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("total", 25)]);
    let a = adapter(&mock);

    let page = a.get_pagination(Condition::new(), &Paging::new(4, 10)).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.meta.count, 0);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn pagination_without_size_is_one_page() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("total", 2)])
        .push_rows(vec![persisted(), persisted()]);
    let a = adapter(&mock);

    let page = a.get_pagination(Condition::new(), &Paging::default()).await.unwrap();
    assert_eq!(page.meta.page_size, 2);
    assert_eq!(page.meta.total_pages, 1);
    assert!(mock.sqls()[1].ends_with("ORDER BY created_at DESC;"));

    mock.push_rows(vec![Record::new().with("total", 2)])
        .push_rows(vec![persisted(), persisted()]);
    let paging = Paging {
        page_number: Some(3),
        ..Paging::default()
    };
    let page = a.get_pagination(Condition::new(), &paging).await.unwrap();
    assert_eq!(page.meta.page_number, 1);
    assert_eq!(page.meta.count, 2);
}

struct ByName(&'static str);

impl FilterParams for ByName {
    fn filter(&self, alias: Option<&str>) -> Condition {
        let column = match alias {
            Some(alias) => format!("{alias}.name"),
            None => "name".to_string(),
        };
        Condition::new().and_cmp(&column, "LIKE", format!("%{}%", self.0))
    }
}

#[tokio::test]
async fn filter_uses_caller_condition() {
    let mock = Arc::new(MockClient::new());
    let a = adapter(&mock);
    a.filter(&ByName("An"), Some(Order::text("-name"))).await.unwrap();
    let call = &mock.calls()[0];
    assert!(call.sql.ends_with("WHERE name LIKE $1 ORDER BY name DESC;"));
    assert_eq!(call.args, vec![Value::from("%An%")]);
}

fn relational(mock: &Arc<MockClient>) -> RelationalAdapter<Profile> {
    RelationalAdapter::builder(QueryExecutor::from_arc(mock.clone()))
        .relations(
            StaticRelations::new()
                .join::<Address>("address", "LEFT JOIN public.address a ON a.subject_id = p.uid"),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn relation_reads_join_and_alias() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![
        Record::new()
            .with("p_uid", 7)
            .with("p_name", "An")
            .with("a_city", "Hue"),
    ]);
    let a = relational(&mock);

    let options = RelationOptions::default()
        .include("address")
        .except("p.metadata")
        .except("a.subject_id");
    let row = a.get_one_relation_by_pk(7, &options).await.unwrap().unwrap();
    assert_eq!(row.aliased("a").value("city"), &Value::from("Hue"));

    let sql = &mock.sqls()[0];
    assert!(sql.starts_with("SELECT \"p\".\"uid\" AS p_uid, \"p\".\"name\" AS p_name"));
    assert!(sql.contains("\"a\".\"city\" AS a_city"));
    assert!(!sql.contains("p_metadata"));
    assert!(sql.ends_with(
        "FROM public.profile p LEFT JOIN public.address a ON a.subject_id = p.uid \
         WHERE p.uid = $1 ORDER BY p.created_at DESC LIMIT 1;"
    ));
}

#[tokio::test]
async fn relation_pagination_shares_joins() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("total", 1)])
        .push_rows(vec![Record::new().with("p_uid", 7)]);
    let a = relational(&mock);

    let options = RelationOptions::default().include("address");
    let page = a
        .get_pagination_relation(
            Condition::new().and_eq("p.status", 1),
            &Paging::new(1, 10),
            &options,
        )
        .await
        .unwrap();
    assert_eq!(page.meta.count, 1);
    let sqls = mock.sqls();
    assert_eq!(
        sqls[0],
        "SELECT COUNT(*) AS total FROM public.profile p \
         LEFT JOIN public.address a ON a.subject_id = p.uid WHERE p.status = $1;"
    );
    assert!(sqls[1].ends_with("WHERE p.status = $1 ORDER BY p.created_at DESC LIMIT 10;"));
}

#[tokio::test]
async fn relation_reads_need_provider_and_known_includes() {
    let mock = Arc::new(MockClient::new());
    let plain = adapter(&mock);
    let err = plain
        .get_all_condition_relation(Condition::new().and_eq("p.uid", 1), &RelationOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let a = relational(&mock);
    let err = a
        .get_many_relation([1, 2], &RelationOptions::default().include("ward"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(mock.call_count(), 0);

    a.get_many_relation([1, 2], &RelationOptions::default())
        .await
        .unwrap();
    assert!(mock.sqls()[0].contains("WHERE p.uid IN ($1, $2)"));
}

#[test]
fn projection_of_uses_model_alias() {
    assert_eq!(Projection::of::<Address>().alias, "a");
}
