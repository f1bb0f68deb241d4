// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth callback tests.
//!
//! These tests verify that:
//! 1. A valid callback exchanges the code and persists the session
//! 2. Forged or incomplete callbacks persist nothing
//! 3. The nonce is single-use whatever the outcome

use fitness_tracker::error::AppError;
use fitness_tracker::storage::{keys, KeyValueStore};
use fitness_tracker::views;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

async fn mock_token_endpoint(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_callback_persists_session() {
    let server = MockServer::start().await;
    let access_token = common::token_with(&json!({ "sub": "user-42" }));
    mock_token_endpoint(&server, common::token_response(&access_token)).await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let authorized = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await
        .unwrap();

    assert_eq!(authorized.user_id.as_deref(), Some("user-42"));
    assert_eq!(app.durable.get(keys::ACCESS_TOKEN), Some(access_token.clone()));
    assert_eq!(app.durable.get(keys::TOKEN), Some(access_token));
    assert_eq!(app.durable.get(keys::REFRESH_TOKEN).as_deref(), Some("refresh-1"));
    assert!(app.durable.get(keys::ID_TOKEN).is_some());
    assert_eq!(app.durable.get(keys::USER_ID).as_deref(), Some("user-42"));
    assert!(app.scoped.get(keys::OAUTH_STATE).is_none());
}

#[tokio::test]
async fn test_code_exchange_sends_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_id=fitness-tracker-frontend"))
        .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_response("opaque")))
        .expect(1)
        .mount(&server)
        .await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    app.state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_state_mismatch_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_response("t")))
        .expect(0)
        .mount(&server)
        .await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let result = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=wrong"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidCallback(_))));
    assert!(app.durable.is_empty());
    assert!(!app.state.session.has_nonce());
}

#[tokio::test]
async fn test_missing_state_or_nonce_is_rejected() {
    let server = MockServer::start().await;
    let app = common::create_test_app(&server.uri());

    // No nonce stored at all
    let result = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await;
    assert!(matches!(result, Err(AppError::InvalidCallback(_))));

    // Nonce stored, state missing from the callback
    app.state.session.save_nonce("XYZ").unwrap();
    let result = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123"))
        .await;
    assert!(matches!(result, Err(AppError::InvalidCallback(_))));
    assert!(!app.state.session.has_nonce());
    assert!(app.durable.is_empty());
}

#[tokio::test]
async fn test_missing_code_is_rejected() {
    let server = MockServer::start().await;
    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let result = app
        .state
        .auth
        .handle_callback(&common::callback_url("state=XYZ"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidCallback(_))));
    assert!(!app.state.session.has_nonce());
    assert!(app.durable.is_empty());
}

#[tokio::test]
async fn test_provider_error_redirect_consumes_nonce() {
    let server = MockServer::start().await;
    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let url = common::callback_url("error=access_denied&state=XYZ");
    assert!(views::auth::is_callback(&url));
    assert!(app.state.auth.handle_callback(&url).await.is_err());
    assert!(!app.state.session.has_nonce());
}

#[tokio::test]
async fn test_token_endpoint_failure_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let result = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await;

    assert!(matches!(result, Err(AppError::TokenExchange(_))));
    assert!(app.durable.is_empty());
    assert!(!app.state.session.has_nonce());
}

#[tokio::test]
async fn test_malformed_access_token_still_stored() {
    let server = MockServer::start().await;
    mock_token_endpoint(&server, json!({ "access_token": "not-a-jwt" })).await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let authorized = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await
        .unwrap();

    assert!(authorized.user_id.is_none());
    assert_eq!(app.durable.get(keys::ACCESS_TOKEN).as_deref(), Some("not-a-jwt"));
    assert!(app.durable.get(keys::USER_ID).is_none());
    assert!(app.durable.get(keys::REFRESH_TOKEN).is_none());
}

#[tokio::test]
async fn test_user_id_claim_fallback() {
    let server = MockServer::start().await;
    let access_token = common::token_with(&json!({ "preferred_username": "runner" }));
    mock_token_endpoint(&server, json!({ "access_token": access_token })).await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let authorized = app
        .state
        .auth
        .handle_callback(&common::callback_url("code=abc123&state=XYZ"))
        .await
        .unwrap();

    assert_eq!(authorized.user_id.as_deref(), Some("runner"));
}

#[tokio::test]
async fn test_clean_url_drops_callback_params() {
    let server = MockServer::start().await;
    mock_token_endpoint(&server, common::token_response("opaque")).await;

    let app = common::create_test_app(&server.uri());
    app.state.session.save_nonce("XYZ").unwrap();

    let authorized = app
        .state
        .auth
        .handle_callback(&common::callback_url(
            "code=abc123&state=XYZ&session_state=s1&iss=http%3A%2F%2Fidp&tab=recent",
        ))
        .await
        .unwrap();

    assert_eq!(authorized.clean_url.as_str(), "http://localhost:5173/?tab=recent");
}

#[tokio::test]
async fn test_initiate_login_stores_nonce_in_url() {
    let server = MockServer::start().await;
    let app = common::create_test_app(&server.uri());

    let first = app.state.auth.initiate_login().unwrap();
    let nonce = app.scoped.get(keys::OAUTH_STATE).unwrap();
    assert_eq!(nonce.len(), 43);

    let state = first
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned());
    assert_eq!(state, Some(nonce.clone()));
    assert!(first.query_pairs().any(|(k, v)| k == "response_type" && v == "code"));

    // A second attempt replaces the nonce
    app.state.auth.initiate_login().unwrap();
    assert_ne!(app.scoped.get(keys::OAUTH_STATE), Some(nonce));
}

#[tokio::test]
async fn test_is_authenticated_and_logout() {
    let server = MockServer::start().await;
    let access_token = common::token_with(&json!({ "sub": "user-42" }));
    mock_token_endpoint(&server, common::token_response(&access_token)).await;

    let app = common::create_test_app(&server.uri());
    assert!(!app.state.auth.is_authenticated());

    let url = app.state.auth.initiate_login().unwrap();
    let nonce = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let screen = views::initialize(
        &app.state,
        Some(&common::callback_url(&format!("code=abc123&state={}", nonce))),
    )
    .await;

    assert_eq!(screen, views::Screen::LoggedIn);
    assert!(app.state.auth.is_authenticated());
    assert_eq!(
        app.state.auth_view.credentials().user_id.as_deref(),
        Some("user-42")
    );
    assert!(app.state.session.user().is_some());

    app.state.auth_view.logout(&app.state).unwrap();

    assert!(!app.state.auth.is_authenticated());
    assert!(!app.state.auth_view.is_logged_in());
    assert!(app.durable.is_empty());
}
