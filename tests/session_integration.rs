//! Session lifecycle integration tests
//!
//! Exercises the session manager against a `wiremock` server: credential
//! exchange, persisted-session rehydration, logout teardown, and the
//! global reaction to a `401` observed mid-session. Each test wires its
//! own client with a session file in a temp directory so nothing leaks
//! between tests.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trazo::error::ApiError;
use trazo::models::ProfileUpdate;
use trazo::session::{SessionManager, SessionState, SessionStore};
use trazo::transport::Transport;

mod common;

/// Login exchanges credentials for a token and installs it before
/// returning, so a request issued immediately afterwards carries it.
#[tokio::test]
async fn test_login_installs_token_for_subsequent_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .and(body_json(json!({"username": "bob", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc123",
            "user": {"id": 1, "username": "bob", "email": "old@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The follow-up listing must present the fresh token.
    Mock::given(method("GET"))
        .and(path("/projects/"))
        .and(header("authorization", "Token abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "name": "Alpha"},
            {"id": 4, "name": "Beta"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.session().login("bob", "secret").await.unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(transport.current_token().await.as_deref(), Some("abc123"));
    assert!(client.session().is_authenticated().await);

    let projects = client.list_projects().await.unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].name, "Alpha");

    // The pair was persisted for the next process.
    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.token, "abc123");
    assert_eq!(persisted.user.username, "bob");
}

/// A rejected login surfaces as `InvalidCredentials` with the server's
/// text and leaves no trace locally.
#[tokio::test]
async fn test_login_rejection_maps_to_invalid_credentials() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "non_field_errors": ["Unable to log in with provided credentials."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.session().login("bob", "wrong").await;
    match result {
        Err(ApiError::InvalidCredentials { detail }) => {
            assert!(detail.contains("Unable to log in"));
        }
        other => panic!("expected InvalidCredentials, got {:?}", other),
    }

    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
    assert!(!client.session().is_authenticated().await);
}

/// Login is a public request: a stale token left in the slot must not be
/// attached. The trap mock is mounted first, so a login request carrying
/// the stale header would hit it and fail the test.
#[tokio::test]
async fn test_login_never_sends_a_stale_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, _store, transport) = common::make_client(&server.uri(), &dir);

    transport.set_token(Some("stale".to_string())).await;

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .and(header("authorization", "Token stale"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh456",
            "user": {"id": 1, "username": "bob"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.session().login("bob", "secret").await.unwrap();
    assert_eq!(transport.current_token().await.as_deref(), Some("fresh456"));
}

/// Registration returns the same `{token, user}` shape as login and
/// starts the session in one step.
#[tokio::test]
async fn test_register_starts_a_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/registro/"))
        .and(body_json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "tok789",
            "user": {"id": 7, "username": "carol", "email": "carol@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registration = trazo::models::Registration {
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
        password: "secret".to_string(),
        first_name: None,
        last_name: None,
    };
    let user = client.session().register(&registration).await.unwrap();
    assert_eq!(user.id, 7);
    assert!(client.session().is_authenticated().await);
    assert_eq!(transport.current_token().await.as_deref(), Some("tok789"));
    assert_eq!(store.load().unwrap().unwrap().token, "tok789");
}

/// Field-level registration errors surface verbatim, not as a generic
/// credentials rejection.
#[tokio::test]
async fn test_register_surfaces_field_errors() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, _store, _transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/registro/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "username": ["A user with that username already exists."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registration = trazo::models::Registration {
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
        password: "secret".to_string(),
        first_name: None,
        last_name: None,
    };
    let result = client.session().register(&registration).await;
    match result {
        Err(ApiError::ValidationFailed { detail }) => {
            assert_eq!(detail, "username: A user with that username already exists.");
        }
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

/// Rehydration verifies the persisted token against the server and
/// adopts the server's profile, catching edits made from elsewhere.
#[tokio::test]
async fn test_init_prefers_the_server_profile() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, _transport) = common::make_client(&server.uri(), &dir);

    store.save(&common::persisted_session("abc123")).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/perfil/"))
        .and(header("authorization", "Token abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "bob",
            "email": "fresh@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.session().init().await.unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("fresh@example.com"));
    assert_eq!(
        client.session().state().await,
        SessionState::Authenticated(user.clone())
    );

    // The fresher profile was written back next to the same token.
    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.token, "abc123");
    assert_eq!(persisted.user.email.as_deref(), Some("fresh@example.com"));
}

/// A persisted token the server rejects is purged; the session comes up
/// anonymous rather than erroring.
#[tokio::test]
async fn test_init_purges_a_rejected_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    store.save(&common::persisted_session("expired")).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/perfil/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client.session().init().await.unwrap();
    assert!(user.is_none());
    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
    assert_eq!(client.session().state().await, SessionState::Anonymous);
}

/// Any verification failure purges, not just an explicit rejection. A
/// token that cannot be vouched for is not kept around.
#[tokio::test]
async fn test_init_purges_on_server_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, _transport) = common::make_client(&server.uri(), &dir);

    store.save(&common::persisted_session("abc123")).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/perfil/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.session().init().await.unwrap();
    assert!(user.is_none());
    assert!(store.load().unwrap().is_none());
    assert_eq!(client.session().state().await, SessionState::Anonymous);
}

/// Logout notifies the server with the token still attached, then tears
/// everything down.
#[tokio::test]
async fn test_logout_notifies_server_and_clears() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    store.save(&common::persisted_session("abc123")).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/perfil/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "bob"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/logout/"))
        .and(header("authorization", "Token abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.session().init().await.unwrap();
    client.session().logout().await.unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
    assert_eq!(client.session().state().await, SessionState::Anonymous);
}

/// A failed server notification does not block logout; local state is
/// cleared regardless.
#[tokio::test]
async fn test_logout_clears_local_state_when_server_errors() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    store.save(&common::persisted_session("abc123")).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/perfil/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "bob"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    client.session().init().await.unwrap();
    client.session().logout().await.unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
}

/// Without a token there is nothing to invalidate server-side; logout
/// only tears down local state.
#[tokio::test]
async fn test_logout_without_a_token_skips_the_server() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, _store, _transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/logout/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    client.session().logout().await.unwrap();
    assert_eq!(client.session().state().await, SessionState::Anonymous);
}

/// Logout also survives the server being unreachable entirely.
#[tokio::test]
async fn test_logout_with_unreachable_server_still_clears() {
    // Grab a port nothing is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let transport = Transport::new(&format!("http://127.0.0.1:{}/", port)).unwrap();
    let store = SessionStore::new_with_path(dir.path().join("session.json")).unwrap();
    store.save(&common::persisted_session("abc123")).unwrap();
    transport.set_token(Some("abc123".to_string())).await;

    let manager = SessionManager::new(transport.clone(), store.clone());
    manager.logout().await.unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
    assert_eq!(manager.state().await, SessionState::Anonymous);
}

/// A `401` on any authenticated call expires the whole session before
/// the error reaches the caller.
#[tokio::test]
async fn test_rejected_call_expires_the_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc123",
            "user": {"id": 1, "username": "bob"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The server has since invalidated the token.
    Mock::given(method("GET"))
        .and(path("/projects/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.session().login("bob", "secret").await.unwrap();
    let result = client.list_projects().await;

    assert!(matches!(result, Err(ApiError::AuthenticationRequired)));
    assert!(store.load().unwrap().is_none());
    assert!(transport.current_token().await.is_none());
    assert_eq!(client.session().state().await, SessionState::Anonymous);
}

/// A successful profile update replaces both the cached and the
/// persisted user.
#[tokio::test]
async fn test_profile_update_persists_the_server_response() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, _transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc123",
            "user": {"id": 1, "username": "bob", "email": "old@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/users/perfil/"))
        .and(header("authorization", "Token abc123"))
        .and(body_json(json!({"email": "new@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "bob",
            "email": "new@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.session().login("bob", "secret").await.unwrap();

    let update = ProfileUpdate {
        email: Some("new@example.com".to_string()),
        ..Default::default()
    };
    let user = client.session().update_profile(&update).await.unwrap();
    assert_eq!(user.email.as_deref(), Some("new@example.com"));

    let cached = client.session().current_user().await.unwrap();
    assert_eq!(cached.email.as_deref(), Some("new@example.com"));
    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.user.email.as_deref(), Some("new@example.com"));
}

/// A rejected profile update leaves the cached user untouched.
#[tokio::test]
async fn test_profile_update_failure_keeps_the_cached_user() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, store, _transport) = common::make_client(&server.uri(), &dir);

    Mock::given(method("POST"))
        .and(path("/users/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc123",
            "user": {"id": 1, "username": "bob", "email": "old@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/users/perfil/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["Enter a valid email address."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.session().login("bob", "secret").await.unwrap();

    let update = ProfileUpdate {
        email: Some("not-an-email".to_string()),
        ..Default::default()
    };
    let result = client.session().update_profile(&update).await;
    assert!(matches!(result, Err(ApiError::ValidationFailed { .. })));

    let cached = client.session().current_user().await.unwrap();
    assert_eq!(cached.email.as_deref(), Some("old@example.com"));
    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.user.email.as_deref(), Some("old@example.com"));
}
