// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitness_tracker::config::Config;
use fitness_tracker::routes::create_router;
use fitness_tracker::storage::{KeyValueStore, MemoryStore};
use fitness_tracker::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

/// Stores and state behind a test app, so tests can inspect storage directly.
#[allow(dead_code)]
pub struct TestApp {
    pub state: Arc<AppState>,
    pub durable: Arc<MemoryStore>,
    pub scoped: Arc<MemoryStore>,
}

/// Config pointing the token endpoint and the API at a mock server.
#[allow(dead_code)]
pub fn test_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.oauth.token_endpoint = Url::parse(&format!("{}/token", server_uri)).unwrap();
    config.api_base_url = Url::parse(&format!("{}/api", server_uri)).unwrap();
    config
}

/// Create a test app over in-memory stores.
#[allow(dead_code)]
pub fn create_test_app(server_uri: &str) -> TestApp {
    create_test_app_with(test_config(server_uri))
}

/// Create a test app over in-memory stores with an explicit config.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let durable = Arc::new(MemoryStore::new());
    let scoped = Arc::new(MemoryStore::new());
    let state = AppState::new(
        config,
        durable.clone() as Arc<dyn KeyValueStore>,
        scoped.clone() as Arc<dyn KeyValueStore>,
    )
    .expect("Failed to build test state");

    TestApp {
        state: Arc::new(state),
        durable,
        scoped,
    }
}

/// Create the loopback router along with its test app.
#[allow(dead_code)]
pub fn create_test_router(server_uri: &str) -> (axum::Router, TestApp) {
    let app = create_test_app(server_uri);
    (create_router(app.state.clone()), app)
}

/// Signed JWT carrying `claims`. The client never verifies signatures.
#[allow(dead_code)]
pub fn token_with(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}

/// Token endpoint response body.
#[allow(dead_code)]
pub fn token_response(access_token: &str) -> Value {
    serde_json::json!({
        "access_token": access_token,
        "refresh_token": "refresh-1",
        "id_token": token_with(&serde_json::json!({
            "sub": "user-42",
            "preferred_username": "runner",
            "email": "runner@example.com"
        })),
        "token_type": "Bearer",
        "expires_in": 300
    })
}

/// Callback URL the provider would redirect to.
#[allow(dead_code)]
pub fn callback_url(query: &str) -> Url {
    Url::parse(&format!("http://localhost:5173/?{}", query)).unwrap()
}
