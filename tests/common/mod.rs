use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use trazo::api::ApiClient;
use trazo::models::User;
use trazo::session::{Session, SessionManager, SessionStore};
use trazo::transport::Transport;

/// Wire a client against the given base URL with a session store living
/// in the provided temp directory.
///
/// Returns the store and transport alongside the client so tests can
/// assert on persisted state and seed or inspect the token slot.
#[allow(dead_code)]
pub fn make_client(base_url: &str, dir: &TempDir) -> (ApiClient, SessionStore, Transport) {
    let transport = Transport::new(base_url).expect("failed to parse base url");
    let store = SessionStore::new_with_path(dir.path().join("session.json"))
        .expect("failed to create session store");
    let session = SessionManager::new(transport.clone(), store.clone());
    let client = ApiClient::with_parts(transport.clone(), session);
    (client, store, transport)
}

#[allow(dead_code)]
pub fn sample_user() -> User {
    User {
        id: 1,
        username: "bob".to_string(),
        email: Some("old@example.com".to_string()),
        first_name: None,
        last_name: None,
    }
}

/// A persisted session as it would look after an earlier login.
#[allow(dead_code)]
pub fn persisted_session(token: &str) -> Session {
    Session {
        token: token.to_string(),
        user: sample_user(),
    }
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
