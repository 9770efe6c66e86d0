//! Adapter calls as a service would make them, against a recording client.

use pgrel::{MockClient, Paging, QueryExecutor, Record, Value, WriteOptions};
use pgrel_domain::service::{self, EMAIL_EXISTED, NOT_FOUND};
use pgrel_domain::{Address, Adapters, DomainConfig, NotificationFilter, Profile};
use serde_json::json;
use std::sync::Arc;

fn adapters(mock: &Arc<MockClient>, config: &DomainConfig) -> Adapters {
    Adapters::new(QueryExecutor::from_arc(mock.clone()), "app", config).unwrap()
}

#[tokio::test]
async fn signup_with_taken_email_is_rejected() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![
        Record::new().with("email", true).with("username", false),
    ]);
    let adapters = adapters(&mock, &DomainConfig::default());

    let profile = Profile {
        username: Some("carol".into()),
        email: Some(" Carol@Example.com ".into()),
        ..Default::default()
    };
    let err = service::respond_one(
        adapters
            .profile
            .insert_one(profile, WriteOptions::default())
            .await,
    )
    .unwrap_err();

    assert_eq!(err.code, EMAIL_EXISTED);
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({"code": "110", "message": err.message, "source": "email"})
    );
    assert_eq!(mock.calls()[0].args[0], Value::from("carol@example.com"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn subject_address_is_created_in_the_configured_country() {
    let config = DomainConfig::from_toml_str("[address]\ndefault_country = \"SG\"\n").unwrap();
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![])
        .push_rows(vec![Record::new().with("uid", 1).with("display_name", "Central")])
        .push_rows(vec![
            Record::new()
                .with("uid", 5)
                .with("subject_id", 42)
                .with("type", "profile")
                .with("country_code", "SG")
                .with("province_code", "01")
                .with("province", "Central"),
        ]);
    let adapters = adapters(&mock, &config);

    let model = Address {
        subject_id: Some(42),
        r#type: Some("profile".into()),
        province_code: Some("01".into()),
        ..Default::default()
    };
    let saved = service::respond_one(adapters.address.get_or_create_by_subject(model).await).unwrap();
    assert_eq!(saved.uid, Some(5));
    assert_eq!(saved.province.as_deref(), Some("Central"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].sql.contains("FROM app.address WHERE subject_id = $1 AND type = $2"));
    assert!(calls[1].sql.contains("FROM app.province"));
    assert_eq!(calls[1].args, vec![Value::from("SG"), Value::from("01")]);
    assert!(calls[2].sql.starts_with("INSERT INTO app.address"));
    assert!(calls[2].args.contains(&Value::from("Central")));
}

#[tokio::test]
async fn missing_address_is_not_found() {
    let mock = Arc::new(MockClient::new());
    let adapters = adapters(&mock, &DomainConfig::default());

    let err = service::respond_get_one(adapters.address.get_one_by_subject(7, None).await)
        .unwrap_err();
    assert_eq!(err.code, NOT_FOUND);
    assert_eq!(mock.sqls().len(), 1);
}

#[tokio::test]
async fn notification_search_returns_a_page_body() {
    let mock = Arc::new(MockClient::new());
    mock.push_rows(vec![Record::new().with("total", 2)]).push_rows(vec![
        Record::new().with("uid", 1).with("title", "Welcome"),
        Record::new().with("uid", 2).with("title", "Welcome back"),
    ]);
    let adapters = adapters(&mock, &DomainConfig::default());

    let params: NotificationFilter = serde_json::from_value(json!({"title": "welcome"})).unwrap();
    let page = service::respond_page(
        adapters
            .notification
            .search(&params, &Paging::new(1, 20))
            .await,
    )
    .unwrap();

    let body = serde_json::to_value(&page).unwrap();
    assert_eq!(body["pagination"]["total"], json!(2));
    assert_eq!(body["pagination"]["totalPages"], json!(1));
    assert_eq!(body["data"][1]["title"], json!("Welcome back"));
    assert_eq!(mock.calls()[1].args, vec![Value::from("%welcome%")]);
}
