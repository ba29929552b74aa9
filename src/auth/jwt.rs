use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// What a bearer token may be used for.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Calls to protected routes.
    Access,
    /// Only `/auth/refresh`.
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct StudentClaims {
    sub: Uuid,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
    kind: TokenKind,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("{expected:?} token required")]
    WrongKind { expected: TokenKind },
}

/// Signing material plus the issuer/audience pair every token is bound to.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        let secret = cfg.secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn issue(&self, student: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let iat = OffsetDateTime::now_utc();
        let lifetime = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = StudentClaims {
            sub: student,
            iat: iat.unix_timestamp(),
            exp: (iat + lifetime).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%student, ?kind, "token issued");
        Ok(token)
    }

    /// The student a token speaks for, provided it is valid and of the
    /// `expected` kind.
    pub fn student_for(&self, token: &str, expected: TokenKind) -> Result<Uuid, TokenError> {
        let mut rules = Validation::default();
        rules.set_audience(&[self.audience.as_str()]);
        rules.set_issuer(&[self.issuer.as_str()]);
        let claims = decode::<StudentClaims>(token, &self.decoding, &rules)?.claims;
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }
        debug!(student = %claims.sub, ?expected, "token accepted");
        Ok(claims.sub)
    }
}
