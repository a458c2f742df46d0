// Integration tests for `RestClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mikrosync_api::{Error, RestClient, RouterApi};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "admin",
        SecretString::from("hunter2".to_string()),
    );
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_collection_with_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/arp"))
        .and(basic_auth("admin", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*1", "address": "192.168.88.10", "mac-address": "AA:BB:CC:00:00:01",
              "interface": "lan", "invalid": "false" },
            { ".id": "*2", "address": "192.168.88.11", "mac-address": "AA:BB:CC:00:00:02",
              "interface": "bridge", "invalid": "false" },
        ])))
        .mount(&server)
        .await;

    let records = client.fetch("/ip/arp").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["address"], "192.168.88.10");
    assert_eq!(records[1]["interface"], "bridge");
}

#[tokio::test]
async fn test_fetch_singleton_menu() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "platform": "MikroTik",
            "board-name": "hAP ac2",
            "total-memory": "134217728",
            "free-memory": "83886080",
        })))
        .mount(&server)
        .await;

    let records = client.fetch("/system/resource").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["board-name"], "hAP ac2");
}

#[tokio::test]
async fn test_fetch_traffic_posts_joined_names() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/interface/monitor-traffic"))
        .and(body_json(json!({ "interface": "ether1,ether2", "once": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "ether1", "rx-bits-per-second": "1200", "tx-bits-per-second": "800" },
            { "name": "ether2", "rx-bits-per-second": "0", "tx-bits-per-second": "0" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client.fetch_traffic("ether1,ether2").await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_fetch_traffic_with_no_interfaces_skips_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client.fetch_traffic("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_value_patches_matching_entry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/firewall/nat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*A", "comment": "ssh" },
            { ".id": "*B", "comment": "web" },
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/ip/firewall/nat/*B"))
        .and(body_json(json!({ "disabled": "true" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ ".id": "*B", "disabled": "true" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let changed = client
        .set_value("/ip/firewall/nat", "disabled", "true", "comment", "web")
        .await
        .unwrap();
    assert!(changed);
}

#[tokio::test]
async fn test_set_value_without_match_returns_false() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*1", "name": "ether1" },
        ])))
        .mount(&server)
        .await;

    let changed = client
        .set_value("/interface", "disabled", "true", "name", "ether9")
        .await
        .unwrap();
    assert!(!changed);
}

#[tokio::test]
async fn test_run_script_by_name() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/system/script/run"))
        .and(body_json(json!({ "number": "backup" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.run_script("backup").await.unwrap());
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.fetch("/interface").await.unwrap_err();
    assert!(err.is_auth_failure(), "got {err:?}");
}

#[tokio::test]
async fn test_missing_menu_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/routerboard"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.fetch("/system/routerboard").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_router_error_body_is_decoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/arp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 400,
            "message": "Bad Request",
            "detail": "no such command prefix",
        })))
        .mount(&server)
        .await;

    match client.fetch("/ip/arp").await.unwrap_err() {
        Error::Router { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "no such command prefix");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/script"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.fetch("/system/script").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}
