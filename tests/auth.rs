use chrono::{Duration, Utc};
use serde_json::json;
use thinknum_client::auth::{Credential, TokenStore};
use thinknum_client::config::AuthSettings;
use thinknum_client::network::HttpClient;
use thinknum_client::Error;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(server: &MockServer, dir: &tempfile::TempDir) -> TokenStore {
    let settings = AuthSettings {
        hostname: server.uri(),
        client_id: "id".to_string(),
        client_secret: "shh".to_string(),
        token_cache_path: dir.path().join("thinknum").join("token.json"),
        ..Default::default()
    };
    TokenStore::new(HttpClient::new().unwrap(), settings)
}

#[tokio::test]
async fn test_valid_cached_token_needs_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&server, &dir);
    store
        .cache(&Credential::new("cached", Utc::now() + Duration::hours(1)))
        .unwrap();

    let cred = store.acquire().await.unwrap();
    assert_eq!(cred.token, "cached");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_token_is_replaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .and(body_string_contains("client_id=id"))
        .and(body_string_contains("client_secret=shh"))
        .and(body_string_contains("version=20151130"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_token": "fresh",
            "auth_expires": "20991231T000000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&server, &dir);
    store
        .cache(&Credential::new("stale", Utc::now() - Duration::minutes(1)))
        .unwrap();

    let cred = store.acquire().await.unwrap();
    assert_eq!(cred.token, "fresh");

    let cached = store.load_cached().unwrap();
    assert_eq!(cached, cred);
    assert!(cached.is_valid());
}

#[tokio::test]
async fn test_missing_cache_requests_and_writes_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_token": "new",
            "auth_expires": "20991231T000000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&server, &dir);
    assert!(store.load_cached().is_none());

    store.acquire().await.unwrap();
    assert!(store.cache_path().is_file());
}

#[tokio::test]
async fn test_unwritable_cache_still_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_token": "t",
            "auth_expires": "20991231T000000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&server, &dir);
    std::fs::create_dir_all(store.cache_path()).unwrap();

    let cred = store.acquire().await.unwrap();
    assert_eq!(cred.token, "t");
    assert!(store.cache_path().is_dir());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&server, &dir);

    match store.acquire().await {
        Err(Error::Auth { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad client");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!store.cache_path().exists());
}
