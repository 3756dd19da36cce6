//! `/api/utenti` driven through the router over an in-memory store.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use ecommerce_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_then_get_returns_same_record() {
    let app = TestApp::new();

    let resp = app
        .post("/api/utenti", json!({"nome": "Anna", "email": "a@x.com"}))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Utente creato");
    assert_eq!(body["data"]["nome"], "Anna");
    assert_eq!(body["data"]["email"], "a@x.com");
    let id = body["id"].as_i64().unwrap();

    let fetched = app.get(&format!("/api/utenti?id={id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["data"], body["data"]);
}

#[tokio::test]
async fn test_list_users_in_id_order_with_count() {
    let app = TestApp::new();
    app.create_user("Anna", "a@x.com").await;
    app.create_user("Bruno", "b@x.com").await;

    let body = app.get("/api/utenti").await.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["nome"], "Anna");
    assert_eq!(body["data"][1]["nome"], "Bruno");
}

#[tokio::test]
async fn test_list_empty_table() {
    let app = TestApp::new();
    let body = app.get("/api/utenti").await.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let app = TestApp::new();
    let resp = app.get("/api/utenti?id=42").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["message"], "Utente non trovato");
}

#[tokio::test]
async fn test_create_requires_name_and_email() {
    let app = TestApp::new();

    for body in [json!({"nome": "Anna"}), json!({"email": "a@x.com"}), json!({})] {
        let resp = app.post("/api/utenti", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.json()["message"], "Nome e email sono obbligatori");
    }
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_create_rejects_malformed_json_and_email() {
    let app = TestApp::new();

    let resp = app.send_raw(Method::POST, "/api/utenti", Some("{nome:")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["status"], "error");

    let resp = app
        .post("/api/utenti", json!({"nome": "Anna", "email": "not-an-email"}))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.create_user("Anna", "a@x.com").await;

    let resp = app
        .post("/api/utenti", json!({"nome": "Altra Anna", "email": "a@x.com"}))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.json()["message"], "Email già registrata");
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn test_put_changes_only_given_field() {
    let app = TestApp::new();
    let id = app.create_user("Anna", "a@x.com").await;

    let resp = app
        .put(&format!("/api/utenti?id={id}"), json!({"nome": "Annalisa"}))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], "Utente aggiornato");

    let data = app.get(&format!("/api/utenti?id={id}")).await.json()["data"].clone();
    assert_eq!(data["nome"], "Annalisa");
    assert_eq!(data["email"], "a@x.com");
}

#[tokio::test]
async fn test_put_errors() {
    let app = TestApp::new();
    let id = app.create_user("Anna", "a@x.com").await;

    let resp = app.put("/api/utenti", json!({"nome": "X"})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "ID utente mancante");

    let resp = app.put(&format!("/api/utenti?id={id}"), json!({})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Nessun dato da aggiornare");

    let resp = app.put("/api/utenti?id=999", json!({"nome": "X"})).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.put("/api/utenti?id=abc", json!({"nome": "X"})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new();
    let id = app.create_user("Anna", "a@x.com").await;

    let resp = app.delete(&format!("/api/utenti?id={id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], "Utente eliminato");
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_delete_unknown_user_leaves_store_unchanged() {
    let app = TestApp::new();
    app.create_user("Anna", "a@x.com").await;

    let resp = app.delete("/api/utenti?id=99").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.user_count().await, 1);

    let resp = app.delete("/api/utenti").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "ID utente mancante");
}

#[tokio::test]
async fn test_delete_user_with_orders_is_conflict() {
    let app = TestApp::new();
    let id = app.create_user("Anna", "a@x.com").await;
    app.create_order("a@x.com", "Penna", 2).await;

    let resp = app.delete(&format!("/api/utenti?id={id}")).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(app.store.user_count().await, 1);
    assert_eq!(app.store.order_count().await, 1);
}
