//! Contract Test: PDD Admin API
//!
//! Constraints verified:
//! - Each trait call makes exactly one request to the documented endpoint
//! - The token travels in the `PddToken` header
//! - API-level failures surface as `Error::Registrar` with the API message
//! - Rejected tokens surface as `Error::Authentication`
//! - Redirects are never followed

use pdd_core::traits::{NewRecord, Registrar};
use pdd_core::Error;
use pdd_registrar_yandex::YandexPddRegistrar;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-pdd-token";

fn registrar(server: &MockServer) -> YandexPddRegistrar {
    YandexPddRegistrar::new(TOKEN)
        .unwrap()
        .with_base_url(server.uri())
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": "ok" }))
}

#[tokio::test]
async fn add_posts_form_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dns/add"))
        .and(header("PddToken", TOKEN))
        .and(body_string_contains("domain=example.com"))
        .and(body_string_contains("type=A"))
        .and(body_string_contains("subdomain=www"))
        .and(body_string_contains("content=127.0.0.1"))
        .and(body_string_contains("ttl=60"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let record = NewRecord::new("www", "A", "127.0.0.1").with_ttl(Some(60));
    registrar(&server)
        .add_record("example.com", &record)
        .await
        .expect("add succeeds");
}

#[tokio::test]
async fn add_srv_sends_target() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dns/add"))
        .and(body_string_contains("weight=60"))
        .and(body_string_contains("port=5060"))
        .and(body_string_contains("target=sip.example.com."))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let record = NewRecord::srv("_sip._tcp", 10, 60, 5060, "sip.example.com.");
    registrar(&server)
        .add_record("example.com", &record)
        .await
        .expect("add succeeds");
}

#[tokio::test]
async fn api_error_message_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dns/add"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": "error", "error": "bad_domain" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = NewRecord::new("www", "A", "127.0.0.1");
    let err = registrar(&server)
        .add_record("example.com", &record)
        .await
        .unwrap_err();

    match err {
        Error::Registrar { registrar, message } => {
            assert_eq!(registrar, "yandex");
            assert_eq!(message, "bad_domain");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn delete_posts_record_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dns/del"))
        .and(header("PddToken", TOKEN))
        .and(body_string_contains("domain=example.com"))
        .and(body_string_contains("record_id=42"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    registrar(&server)
        .delete_record("example.com", "42")
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn list_returns_records_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/list"))
        .and(query_param("domain", "example.com"))
        .and(header("PddToken", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": "ok",
            "records": [
                { "record_id": 7, "type": "A", "ttl": 21600, "subdomain": "www",
                  "content": "127.0.0.1" },
                { "record_id": 8, "type": "MX", "ttl": 21600, "subdomain": "@",
                  "priority": 10, "content": "mx.example.com." }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = registrar(&server)
        .list_records("example.com")
        .await
        .expect("list succeeds");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 7);
    assert_eq!(records[0].subdomain, "www");
    assert_eq!(records[0].priority, None);
    assert_eq!(records[1].record_type, "MX");
    assert_eq!(records[1].priority, Some(json!(10)));
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/list"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = registrar(&server)
        .list_records("example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "got {:?}", err);
}

#[tokio::test]
async fn redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dns/del"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "http://127.0.0.1:1/elsewhere"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = registrar(&server)
        .delete_record("example.com", "1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {:?}", err);
}

#[tokio::test]
async fn garbage_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = registrar(&server)
        .list_records("example.com")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Parse PDD answer"), "got {}", err);
}
