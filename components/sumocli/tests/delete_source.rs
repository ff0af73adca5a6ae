//! delete_source cmdlet runs against a local fake API.

mod common;

use common::{FakeSumoApi, ORG_ID, config};
use hyper::{Method, StatusCode};
use serde_json::{Value, json};
use std::fs;
use sumocli::{SumoApiError, run_delete_source};

const SOURCES_PATH: &str = "/v1/collectors/101/sources";

fn listing() -> Value {
    json!({
        "sources": [
            {"id": 201, "name": "apache", "sourceType": "LocalFile", "category": "prod/web"},
            {
                "id": 202,
                "name": "syslog",
                "sourceType": "Syslog",
                "category": "prod/os",
                "port": 514
            },
        ]
    })
}

fn read_backup(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn backs_up_matching_source_then_deletes_it() {
    let api = FakeSumoApi::start().await;
    api.route(Method::GET, SOURCES_PATH, StatusCode::OK, listing().to_string());
    api.route(Method::DELETE, "/v1/collectors/101/sources/202", StatusCode::OK, "");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf(), "101", "202");

    let outcome = run_delete_source(&api.client(), &cfg).await.unwrap();

    assert_eq!(
        outcome.backup_path,
        dir.path().join(format!("us2_{ORG_ID}.202.json"))
    );
    assert!(outcome.backed_up());
    assert_eq!(outcome.status, StatusCode::OK);

    let backup = read_backup(&outcome.backup_path);
    assert_eq!(
        backup,
        json!({
            "orgid": ORG_ID,
            "source": {
                "202": {
                    "parent": ORG_ID,
                    "id": 202,
                    "name": "syslog",
                    "dump": listing()["sources"][1],
                }
            }
        })
    );

    assert_eq!(
        api.calls(),
        vec![
            (Method::GET, "/api/v1/collectors/101/sources".to_string()),
            (Method::DELETE, "/api/v1/collectors/101/sources/202".to_string()),
        ]
    );
}

#[tokio::test]
async fn deletes_even_when_source_is_not_listed() {
    let api = FakeSumoApi::start().await;
    api.route(Method::GET, SOURCES_PATH, StatusCode::OK, listing().to_string());
    api.route(Method::DELETE, "/v1/collectors/101/sources/999", StatusCode::OK, "");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf(), "101", "999");

    let outcome = run_delete_source(&api.client(), &cfg).await.unwrap();

    assert!(!outcome.backed_up());
    assert_eq!(
        read_backup(&outcome.backup_path),
        json!({"orgid": ORG_ID, "source": {}})
    );

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        (Method::DELETE, "/api/v1/collectors/101/sources/999".to_string())
    );
}

#[tokio::test]
async fn string_ids_in_listing_match() {
    let api = FakeSumoApi::start().await;
    api.route(
        Method::GET,
        SOURCES_PATH,
        StatusCode::OK,
        json!({"sources": [{"id": "202", "name": "syslog"}]}).to_string(),
    );
    api.route(Method::DELETE, "/v1/collectors/101/sources/202", StatusCode::OK, "");

    let dir = tempfile::tempdir().unwrap();
    let outcome = run_delete_source(&api.client(), &config(dir.path().to_path_buf(), "101", "202"))
        .await
        .unwrap();

    let backup = read_backup(&outcome.backup_path);
    assert_eq!(backup["source"]["202"]["id"], json!("202"));
}

#[tokio::test]
async fn existing_backup_file_is_overwritten() {
    let api = FakeSumoApi::start().await;
    api.route(Method::GET, SOURCES_PATH, StatusCode::OK, listing().to_string());
    api.route(Method::DELETE, "/v1/collectors/101/sources/201", StatusCode::OK, "");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf(), "101", "201");
    fs::write(cfg.backup_target(), "{\"stale\": true}").unwrap();

    run_delete_source(&api.client(), &cfg).await.unwrap();

    let backup = read_backup(&cfg.backup_target());
    assert!(backup.get("stale").is_none());
    assert_eq!(backup["source"]["201"]["name"], json!("apache"));
}

#[tokio::test]
async fn failed_listing_stops_before_backup_and_delete() {
    let api = FakeSumoApi::start().await;
    let reason =
        r#"{"status":401,"code":"unauthorized","message":"Credential could not be verified."}"#;
    api.route(Method::GET, SOURCES_PATH, StatusCode::UNAUTHORIZED, reason);

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf(), "101", "202");

    let err = run_delete_source(&api.client(), &cfg).await.unwrap_err();

    let api_err = err.downcast_ref::<SumoApiError>().unwrap();
    assert_eq!(api_err.status(), Some(StatusCode::UNAUTHORIZED));
    match api_err {
        SumoApiError::Http { reason: got, .. } => assert_eq!(got, reason),
        other => panic!("unexpected error: {other}"),
    }

    assert!(!cfg.backup_target().exists());
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn unwritable_backup_prevents_delete() {
    let api = FakeSumoApi::start().await;
    api.route(Method::GET, SOURCES_PATH, StatusCode::OK, listing().to_string());
    api.route(Method::DELETE, "/v1/collectors/101/sources/202", StatusCode::OK, "");

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().join("does-not-exist"), "101", "202");

    assert!(run_delete_source(&api.client(), &cfg).await.is_err());
    assert!(
        api.calls().iter().all(|(method, _)| *method != Method::DELETE),
        "delete must not be issued without a backup"
    );
}

#[tokio::test]
async fn rejected_delete_keeps_backup_and_surfaces_body() {
    let api = FakeSumoApi::start().await;
    api.route(Method::GET, SOURCES_PATH, StatusCode::OK, listing().to_string());
    api.route(
        Method::DELETE,
        "/v1/collectors/101/sources/202",
        StatusCode::FORBIDDEN,
        "source is locked",
    );

    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf(), "101", "202");

    let err = run_delete_source(&api.client(), &cfg).await.unwrap_err();

    assert!(format!("{err:#}").contains("source is locked"));
    assert_eq!(
        read_backup(&cfg.backup_target())["source"]["202"]["name"],
        json!("syslog")
    );
}
