//! Route handlers for the demo service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::AuthenticatedUser;
use super::AppState;

/// Body of `POST /admin`.
#[derive(Debug, Deserialize)]
pub struct AdminUpdate {
    pub value: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn ping() -> &'static str {
    "pong"
}

/// Look up the stored value for a user. Always `200`, even when unset.
pub async fn get_user(State(state): State<AppState>, Path(user): Path<String>) -> Json<Value> {
    let body = match state.store.get(&user).await {
        Some(value) => json!({ "user": user, "value": value }),
        None => json!({ "user": user, "status": "no value" }),
    };
    Json(body)
}

/// Store a value for the authenticated user.
///
/// An empty `value` is rejected with `400` and leaves the store unchanged.
pub async fn post_admin(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(update): Json<AdminUpdate>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if update.value.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "value must not be empty" })),
        ));
    }
    tracing::debug!(user = %user, "Storing admin value");
    state.store.set(user, update.value).await;
    Ok(Json(json!({ "status": "ok" })))
}
