//! Bearer-token authentication for shelf routes.
//!
//! Verifying a token is delegated to a [`TokenVerifier`]. [`require_auth`]
//! turns the `Authorization` header into a [`User`] on the request, and
//! [`AuthenticatedUser`] reads it back inside handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use shelf_http::error::AppError;
use thiserror::Error;

/// Authenticated principal, immutable for the lifetime of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization token was found")]
    CredentialsRequired,

    #[error("Format is Authorization: Bearer [token]")]
    BadScheme,

    #[error("{0}")]
    InvalidToken(String),

    /// The verifier itself failed; not the caller's fault
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::CredentialsRequired => "credentials_required",
            AuthError::BadScheme => "credentials_bad_scheme",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Unavailable(_) => "verifier_unavailable",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unavailable(source) => {
                AppError::Internal(source.context("token verification failed"))
            }
            other => AppError::unauthorized(other.code(), other.to_string()),
        }
    }
}

/// Resolves a bearer token to the user it was issued for
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<User, AuthError>;
}

/// Fixed token table, fed from configuration (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct StaticTokenVerifier {
    users: HashMap<String, User>,
}

impl StaticTokenVerifier {
    pub fn new(users: impl IntoIterator<Item = (String, User)>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<User, AuthError> {
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("invalid token".to_string()))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::CredentialsRequired)?
        .to_str()
        .map_err(|_| AuthError::BadScheme)?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::BadScheme),
    }
}

/// Authentication middleware
///
/// Inserts the verified [`User`] into request extensions. Failures become
/// `AppError::Unauthorized`, answered by the error middleware with a 401.
pub async fn require_auth(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.to_string();

    let user = verifier.verify(&token).await.map_err(|err| {
        tracing::debug!(code = err.code(), "token verification failed: {}", err);
        err
    })?;

    tracing::debug!(user_id = %user.id, "request authenticated");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The caller, as established by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AuthError::CredentialsRequired.into())
    }
}
