//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use campusconnect::api::models::User;
use campusconnect::api::ApiClient;
use campusconnect::app::App;
use campusconnect::config::{Config, ConfigStore};
use campusconnect::session::{SessionContext, SessionStore};
use campusconnect::storage::{HttpObjectStore, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use mock_backend::MockBackend;

pub fn user(id: i64, username: &str) -> User {
    serde_json::from_value(user_json(id, username, false)).expect("valid user")
}

pub fn admin(id: i64, username: &str) -> User {
    serde_json::from_value(user_json(id, username, true)).expect("valid user")
}

pub fn user_json(id: i64, username: &str, admin: bool) -> serde_json::Value {
    serde_json::json!({
        "user_id": id,
        "username": username,
        "first_name": username.to_uppercase(),
        "last_name": "Test",
        "email": format!("{}@campus.edu", username),
        "gender": "female",
        "admin": admin,
    })
}

/// Config pointed at the mock, with intervals short enough for tests.
pub fn test_config(mock: &MockBackend) -> Config {
    let mut config = Config::default();
    config.api.base_url = mock.base_url();
    config.storage.base_url = format!("{}/storage", mock.base_url());
    config.polling.chat_messages_ms = 50;
    config.polling.unread_count_ms = 50;
    config.polling.following_ms = 50;
    config.search.debounce_ms = 30;
    config
}

pub fn client(mock: &MockBackend) -> ApiClient {
    ApiClient::with_client(reqwest::Client::new(), &mock.base_url())
}

pub fn storage(mock: &MockBackend) -> Arc<dyn ObjectStore> {
    Arc::new(HttpObjectStore::with_client(
        reqwest::Client::new(),
        &format!("{}/storage", mock.base_url()),
    ))
}

/// Session backed by a file inside `dir`.
pub fn session_in(dir: &TempDir) -> SessionContext {
    SessionContext::restore(SessionStore::new(dir.path().join("session.json")))
}

/// An app wired to the mock, optionally already logged in.
pub fn make_app(mock: &MockBackend, logged_in: Option<User>) -> (TempDir, App) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let session = session_in(&dir);
    if let Some(user) = logged_in {
        session.begin(user).expect("session should persist");
    }
    let config = ConfigStore::new(test_config(mock), PathBuf::from("/tmp/campus-test.toml"));
    let app = App::from_parts(config, client(mock), storage(mock), session);
    (dir, app)
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
