use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{db::models::AuthUser, rejections::AppError, AppState};

/// The raw token of an `Authorization: Bearer <token>` header.
pub struct BearerToken(pub String);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(|token| BearerToken(token.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

/// Guard extractor that resolves the bearer token to its user.
pub struct AuthGuard(pub AuthUser);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Err(AppError::Unauthorized);
        };

        match state.auth.authenticate(token).await? {
            Some(user) => Ok(AuthGuard(user)),
            None => Err(AppError::Unauthorized),
        }
    }
}

impl AuthGuard {
    /// Reject requests that name a user other than the authenticated one.
    pub fn ensure_self(&self, username: &str) -> Result<(), AppError> {
        if self.0.username != username {
            tracing::warn!(
                "user {} tried to act as {username}",
                self.0.username
            );
            return Err(AppError::Forbidden("cannot act on behalf of another user"));
        }
        Ok(())
    }
}
