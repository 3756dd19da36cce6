//! Server-side failures through the router.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use ecommerce_integration_tests::{BrokenStore, Failure, TestApp};
use serde_json::json;

fn failing_app(expose_error_detail: bool) -> TestApp<BrokenStore> {
    TestApp::with_store(BrokenStore::new(Failure::Database), expose_error_detail)
}

#[tokio::test]
async fn test_database_error_hides_detail_by_default() {
    let app = failing_app(false);

    let resp = app.get("/api/utenti").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Errore del database");
    assert!(body.get("error").is_none(), "{}", resp.body);
}

#[tokio::test]
async fn test_database_error_detail_when_exposed() {
    let app = failing_app(true);

    let resp = app
        .post("/api/utenti", json!({"nome": "Anna", "email": "a@x.com"}))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.json();
    assert_eq!(body["message"], "Errore del database");
    assert!(body["error"].as_str().unwrap().contains("pool timed out"));
}

#[tokio::test]
async fn test_database_error_in_xml() {
    let hidden = failing_app(false).get("/api/ordini?format=xml").await;
    assert_eq!(hidden.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(hidden.content_type().starts_with("application/xml"));
    assert!(hidden.body.contains("<status>error</status>"));
    assert!(hidden.body.contains("<message>Errore del database</message>"));
    assert!(!hidden.body.contains("<error>"));

    let exposed = failing_app(true).get("/api/ordini?format=xml").await;
    assert_eq!(exposed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(exposed.body.contains("<error>"));
}

#[tokio::test]
async fn test_validation_runs_before_the_store() {
    let app = failing_app(false);

    let resp = app.post("/api/ordini", json!({"utente": "a@x.com"})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Dati mancanti");
}

#[tokio::test]
async fn test_readiness_fails_when_store_is_down() {
    let resp = failing_app(false).get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_panic_becomes_server_error_envelope() {
    let app = TestApp::with_store(BrokenStore::new(Failure::Panic), true);

    let resp = app.delete("/api/ordini?id=1").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.content_type().starts_with("application/json"));
    let body = resp.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Errore del server");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_panic_response_keeps_cors_headers() {
    let app = TestApp::with_store(BrokenStore::new(Failure::Panic), false);
    let req = axum::http::Request::builder()
        .uri("/api/utenti")
        .header(header::ORIGIN, "http://shop.example")
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = tower::ServiceExt::oneshot(app.router.clone(), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
