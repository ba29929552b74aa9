use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::store::Record;

/// User account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // lowercased school email
    pub password_hash: String,      // Argon2 hash, never returned by the API
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime, // creation timestamp
}

fn active_by_default() -> bool {
    true
}

impl User {
    pub fn new(email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Record for User {
    const ENTITY: &'static str = "User";
    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Single-use password reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(default)]
    pub is_used: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    pub fn issue(user_id: Uuid, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(43)
            .map(char::from)
            .collect();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            expires_at: now + ttl,
            is_used: false,
            created_at: now,
        }
    }

    /// Unused and not yet expired.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        !self.is_used && now < self.expires_at
    }
}

impl Record for PasswordResetToken {
    const ENTITY: &'static str = "Reset token";
    fn id(&self) -> Uuid {
        self.id
    }
}
