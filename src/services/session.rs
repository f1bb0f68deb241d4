// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single owner of persisted authentication state.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Session, TokenResponse, UserProfile};
use crate::storage::{keys, KeyValueStore};

/// Reads and writes the session in its two backing stores.
///
/// `durable` survives restarts and holds the tokens, user id and cached
/// profile. `scoped` lives for one login attempt's process and holds the
/// anti-forgery nonce.
#[derive(Clone)]
pub struct SessionManager {
    durable: Arc<dyn KeyValueStore>,
    scoped: Arc<dyn KeyValueStore>,
}

impl SessionManager {
    pub fn new(durable: Arc<dyn KeyValueStore>, scoped: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, scoped }
    }

    // ─── Tokens ──────────────────────────────────────────────────────────────

    /// Persist a token response and the user id derived from it.
    ///
    /// Keys are written one at a time. Optional tokens the response omits are
    /// removed so they cannot outlive the session they belonged to.
    pub fn store_tokens(&self, tokens: &TokenResponse, user_id: Option<&str>) -> Result<()> {
        self.durable.set(keys::ACCESS_TOKEN, &tokens.access_token)?;
        self.durable.set(keys::TOKEN, &tokens.access_token)?;
        self.set_or_remove(keys::REFRESH_TOKEN, tokens.refresh_token.as_deref())?;
        self.set_or_remove(keys::ID_TOKEN, tokens.id_token.as_deref())?;
        self.set_or_remove(keys::USER_ID, user_id)?;
        Ok(())
    }

    /// Current access token. Falls back to the view store's copy.
    pub fn access_token(&self) -> Option<String> {
        self.read(keys::ACCESS_TOKEN)
            .or_else(|| self.read(keys::TOKEN))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(keys::REFRESH_TOKEN)
    }

    pub fn id_token(&self) -> Option<String> {
        self.read(keys::ID_TOKEN)
    }

    /// Write the view store's copy of the access token.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.durable.set(keys::TOKEN, token)
    }

    // ─── User ────────────────────────────────────────────────────────────────

    pub fn user_id(&self) -> Option<String> {
        self.read(keys::USER_ID)
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.set_or_remove(keys::USER_ID, Some(user_id))
    }

    /// Cached profile. Placeholder strings and malformed JSON read as absent.
    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.read(keys::USER)?;
        if raw == "undefined" || raw == "null" {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!(key = keys::USER, error = %e, "Unparseable cached user profile");
                None
            }
        }
    }

    pub fn set_user(&self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| anyhow::anyhow!("serialize user profile: {e}"))?;
        self.durable.set(keys::USER, &json)
    }

    // ─── Anti-forgery nonce ──────────────────────────────────────────────────

    /// Store the nonce for the login attempt in progress, replacing any other.
    pub fn save_nonce(&self, nonce: &str) -> Result<()> {
        self.scoped.set(keys::OAUTH_STATE, nonce)
    }

    /// Remove and return the stored nonce.
    pub fn take_nonce(&self) -> Result<Option<String>> {
        let nonce = self.scoped.get(keys::OAUTH_STATE);
        if nonce.is_some() {
            self.scoped.remove(keys::OAUTH_STATE)?;
        }
        Ok(nonce)
    }

    pub fn has_nonce(&self) -> bool {
        self.scoped.get(keys::OAUTH_STATE).is_some()
    }

    // ─── Whole session ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Session {
        Session {
            access_token: self.access_token(),
            refresh_token: self.refresh_token(),
            id_token: self.id_token(),
            user_id: self.user_id(),
            user: self.user(),
        }
    }

    /// Remove every persisted key and the nonce.
    pub fn clear(&self) -> Result<()> {
        for key in keys::DURABLE {
            self.durable.remove(key)?;
        }
        self.scoped.remove(keys::OAUTH_STATE)?;
        Ok(())
    }

    /// Durable value, with empty strings treated as absent.
    fn read(&self, key: &str) -> Option<String> {
        self.durable.get(key).filter(|v| !v.is_empty())
    }

    fn set_or_remove(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.durable.set(key, v),
            None => self.durable.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn manager() -> (SessionManager, Arc<MemoryStore>, Arc<MemoryStore>) {
        let durable = Arc::new(MemoryStore::new());
        let scoped = Arc::new(MemoryStore::new());
        (
            SessionManager::new(durable.clone(), scoped.clone()),
            durable,
            scoped,
        )
    }

    fn tokens() -> TokenResponse {
        TokenResponse {
            access_token: "a.b.c".to_string(),
            refresh_token: Some("r1".to_string()),
            id_token: Some("i.d.t".to_string()),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(300),
            scope: None,
        }
    }

    #[test]
    fn test_store_tokens_writes_every_key() {
        let (session, durable, _) = manager();
        session.store_tokens(&tokens(), Some("user-42")).unwrap();

        assert_eq!(durable.get("access_token").as_deref(), Some("a.b.c"));
        assert_eq!(durable.get("token").as_deref(), Some("a.b.c"));
        assert_eq!(durable.get("refresh_token").as_deref(), Some("r1"));
        assert_eq!(durable.get("id_token").as_deref(), Some("i.d.t"));
        assert_eq!(durable.get("userId").as_deref(), Some("user-42"));
    }

    #[test]
    fn test_store_tokens_drops_stale_optional_values() {
        let (session, durable, _) = manager();
        session.store_tokens(&tokens(), Some("user-42")).unwrap();

        let fresh = TokenResponse {
            refresh_token: None,
            id_token: None,
            ..tokens()
        };
        session.store_tokens(&fresh, None).unwrap();

        assert!(durable.get("refresh_token").is_none());
        assert!(durable.get("id_token").is_none());
        assert!(durable.get("userId").is_none());
        assert!(session.access_token().is_some());
    }

    #[test]
    fn test_access_token_falls_back_to_view_copy() {
        let (session, _, _) = manager();
        assert!(session.access_token().is_none());

        session.set_token("t1").unwrap();
        assert_eq!(session.access_token().as_deref(), Some("t1"));
    }

    #[test]
    fn test_user_placeholders_read_as_absent() {
        let (session, durable, _) = manager();
        durable.set("user", "undefined").unwrap();
        assert!(session.user().is_none());

        durable.set("user", "{broken").unwrap();
        assert!(session.user().is_none());

        let profile = UserProfile {
            sub: Some("user-42".to_string()),
            ..Default::default()
        };
        session.set_user(&profile).unwrap();
        assert_eq!(session.user(), Some(profile));
    }

    #[test]
    fn test_nonce_is_single_use() {
        let (session, _, scoped) = manager();
        session.save_nonce("first").unwrap();
        session.save_nonce("second").unwrap();

        assert_eq!(session.take_nonce().unwrap().as_deref(), Some("second"));
        assert!(scoped.is_empty());
        assert!(session.take_nonce().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (session, durable, scoped) = manager();
        session.store_tokens(&tokens(), Some("user-42")).unwrap();
        session.set_user(&UserProfile::default()).unwrap();
        session.save_nonce("n").unwrap();

        session.clear().unwrap();

        assert!(durable.is_empty());
        assert!(scoped.is_empty());
        assert_eq!(session.snapshot(), Session::default());
    }
}
