//! HTTP basic authentication for the admin routes.
//!
//! Provides:
//! - [`Accounts`]: the fixed user/password table
//! - [`AuthenticatedUser`]: an extractor that rejects with `401` and a
//!   `WWW-Authenticate: Basic` challenge

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

const CHALLENGE: &str = "Basic realm=\"Authorization Required\"";

/// Known users and their passwords.
#[derive(Debug, Clone)]
pub struct Accounts {
    users: Arc<HashMap<String, String>>,
}

impl Accounts {
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        let users = users
            .into_iter()
            .map(|(user, password)| (user.into(), password.into()))
            .collect();
        Self {
            users: Arc::new(users),
        }
    }

    /// Returns true when `user` exists and `password` matches.
    pub fn verify(&self, user: &str, password: &str) -> bool {
        self.users
            .get(user)
            .is_some_and(|expected| expected == password)
    }
}

impl Default for Accounts {
    fn default() -> Self {
        Self::new([("foo", "bar"), ("manu", "123")])
    }
}

/// Name of the user who passed basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Rejection for missing or wrong credentials.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        let mut response = StatusCode::UNAUTHORIZED.into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(CHALLENGE),
        );
        response
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Accounts: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let accounts = Accounts::from_ref(state);

        let (user, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(decode_credentials)
            .ok_or(Unauthorized)?;

        if accounts.verify(&user, &password) {
            Ok(Self(user))
        } else {
            tracing::debug!(user = %user, "Rejected basic auth credentials");
            Err(Unauthorized)
        }
    }
}

/// Decode an `Authorization: Basic <base64(user:password)>` header value.
fn decode_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
