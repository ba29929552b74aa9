use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenError, TokenKind};
use crate::error::AppError;

/// Extracts and validates the bearer access token, yielding the user ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Not logged in"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header"))?;

        match keys.student_for(token, TokenKind::Access) {
            Ok(student) => Ok(AuthUser(student)),
            Err(e @ TokenError::WrongKind { .. }) => Err(AppError::unauthorized(e.to_string())),
            Err(e) => {
                warn!(error = %e, "bearer token rejected");
                Err(AppError::unauthorized(e.to_string()))
            }
        }
    }
}
