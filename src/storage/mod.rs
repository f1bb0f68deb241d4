//! Key/value persistence for the client session.
//!
//! Two stores back a session: a durable one that survives restarts
//! ([`FileStore`]) and a session-scoped one that lives as long as the process
//! ([`MemoryStore`]). Only [`crate::services::SessionManager`] talks to them.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// String key/value store.
///
/// Writes are per key; there is no multi-key transaction.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Key names as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Copy of the access token read by the view store
    pub const TOKEN: &str = "token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const ID_TOKEN: &str = "id_token";
    pub const USER_ID: &str = "userId";
    /// Cached user profile (JSON)
    pub const USER: &str = "user";

    /// Anti-forgery nonce, session-scoped store only
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Every durable key, in the order they are cleared on logout.
    pub const DURABLE: [&str; 6] = [ACCESS_TOKEN, TOKEN, REFRESH_TOKEN, ID_TOKEN, USER_ID, USER];
}
