use std::path::PathBuf;

use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    pub enabled: bool,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
                random_secret()
            }
        };
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "study-buddy".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "study-buddy-users".into()),
            ttl_minutes: minutes_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: minutes_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let reset = ResetConfig {
            enabled: std::env::var("PASSWORD_RESET_ENABLED")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            ttl_minutes: minutes_or("RESET_TOKEN_TTL_MINUTES", 15),
        };
        Ok(Self {
            data_dir,
            jwt,
            reset,
        })
    }
}

/// Upper bound for every TTL setting (one year).
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

fn minutes_or(key: &str, default: i64) -> i64 {
    clamp_minutes(std::env::var(key).ok().as_deref(), default)
}

fn clamp_minutes(raw: Option<&str>, default: i64) -> i64 {
    let minutes = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default);
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        tracing::warn!(minutes, "ttl out of range; clamped");
    }
    minutes.clamp(1, MAX_TTL_MINUTES)
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_settings_are_clamped() {
        assert_eq!(clamp_minutes(None, 15), 15);
        assert_eq!(clamp_minutes(Some(" 30 "), 15), 30);
        assert_eq!(clamp_minutes(Some("soon"), 15), 15);
        assert_eq!(clamp_minutes(Some("0"), 15), 1);
        assert_eq!(clamp_minutes(Some("-5"), 15), 1);
        assert_eq!(
            clamp_minutes(Some("9223372036854775807"), 15),
            MAX_TTL_MINUTES
        );
        // The largest accepted value still yields a usable expiry.
        let expiry = time::OffsetDateTime::now_utc()
            + time::Duration::minutes(clamp_minutes(Some("99999999999999"), 15));
        assert!(expiry > time::OffsetDateTime::now_utc());
    }
}
