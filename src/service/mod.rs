//! HTTP handlers for the demo service.

pub mod auth;
pub mod handlers;
pub mod store;

pub use auth::{Accounts, AuthenticatedUser};
pub use store::ValueStore;

use std::sync::Arc;

use axum::extract::FromRef;

/// State shared across handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<ValueStore>,
    pub accounts: Accounts,
}

impl AppState {
    pub fn new(accounts: Accounts) -> Self {
        Self {
            store: Arc::new(ValueStore::new()),
            accounts,
        }
    }
}

impl FromRef<AppState> for Accounts {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}
