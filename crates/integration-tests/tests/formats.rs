//! Response encodings, CORS and method handling shared by both resources.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode, header};
use ecommerce_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_xml_user_listing() {
    let app = TestApp::new();
    app.create_user("Anna", "a@x.com").await;

    let resp = app.get("/api/utenti?format=xml").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.content_type().starts_with("application/xml"));
    assert!(resp.body.starts_with("<?xml version=\"1.0\"?>"));
    assert!(resp.body.contains("<status>success</status>"));
    assert!(
        resp.body
            .contains("<utente><id>1</id><nome>Anna</nome><email>a@x.com</email></utente>")
    );
    assert!(resp.body.contains("<count>1</count>"));
}

#[tokio::test]
async fn test_json_and_xml_carry_same_values() {
    let app = TestApp::new();
    app.create_user("Anna", "a@x.com").await;
    app.create_order("a@x.com", "Penna", 4).await;

    let json = app.get("/api/ordini?id=1").await.json();
    let xml = app.get("/api/ordini?id=1&format=xml").await.body;

    for field in ["id", "utente_id", "email", "nome", "prodotto", "quantita"] {
        let value = &json["data"][field];
        let text = value.as_str().map_or_else(|| value.to_string(), str::to_owned);
        assert!(
            xml.contains(&format!("<{field}>{text}</{field}>")),
            "{field} missing from {xml}"
        );
    }
    assert!(xml.contains("<data><ordine>"));
}

#[tokio::test]
async fn test_format_is_case_insensitive_and_defaults_to_json() {
    let app = TestApp::new();

    let resp = app.get("/api/utenti?format=XML").await;
    assert!(resp.content_type().starts_with("application/xml"));

    let resp = app.get("/api/utenti?format=yaml").await;
    assert!(resp.content_type().starts_with("application/json"));
}

#[tokio::test]
async fn test_errors_use_requested_format() {
    let app = TestApp::new();

    let resp = app.get("/api/utenti?id=9&format=xml").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("<status>error</status>"));
    assert!(resp.body.contains("<message>Utente non trovato</message>"));
}

#[tokio::test]
async fn test_xml_escapes_text() {
    let app = TestApp::new();
    app.create_user("Tom & Jerry <3", "tj@x.com").await;

    let body = app.get("/api/utenti?format=xml").await.body;
    assert!(body.contains("<nome>Tom &amp; Jerry &lt;3</nome>"));
}

#[tokio::test]
async fn test_json_is_pretty_with_verbatim_unicode() {
    let app = TestApp::new();
    app.create_user("Niccolò", "n@x.com").await;

    let resp = app.get("/api/utenti").await;
    assert!(resp.content_type().starts_with("application/json"));
    assert!(resp.body.starts_with("{\n    \"status\": \"success\""));
    assert!(resp.body.contains("\"nome\": \"Niccolò\""));
}

#[tokio::test]
async fn test_options_is_empty_ok() {
    let app = TestApp::new();

    for uri in ["/api/utenti", "/api/ordini"] {
        let resp = app.send(Method::OPTIONS, uri, None).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.is_empty());
    }
}

#[tokio::test]
async fn test_responses_allow_any_origin() {
    let app = TestApp::new();
    let req = axum::http::Request::builder()
        .uri("/api/utenti")
        .header(header::ORIGIN, "http://shop.example")
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = tower::ServiceExt::oneshot(app.router.clone(), req)
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unsupported_method_is_405() {
    let app = TestApp::new();

    for uri in ["/api/utenti", "/api/ordini?format=xml"] {
        let resp = app.send(Method::PATCH, uri, Some(json!({}))).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(resp.body.contains("Metodo non consentito"));
        assert!(resp.headers.contains_key(header::ALLOW));
    }
}

#[tokio::test]
async fn test_malformed_query_is_400() {
    let app = TestApp::new();

    let resp = app.get("/api/utenti?id=1&id=2").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["status"], "error");

    let resp = app.get("/api/ordini?utente_id=abc").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_keeps_requested_format() {
    let app = TestApp::new();

    let resp = app.get("/api/utenti?id=1&id=2&format=xml").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.content_type().starts_with("application/xml"));
    assert!(resp.body.contains("<status>error</status>"));

    let resp = app.get("/api/ordini?utente_id=1&utente_id=2").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.content_type().starts_with("application/json"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");

    let resp = app.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}
