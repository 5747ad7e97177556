//! In-memory user value store.

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-user string values, shared by all handlers.
#[derive(Debug, Default)]
pub struct ValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: &str) -> Option<String> {
        self.values.read().await.get(user).cloned()
    }

    /// Store `value` for `user`, replacing any previous value.
    pub async fn set(&self, user: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(user.into(), value.into());
    }
}
