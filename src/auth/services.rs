use axum::extract::FromRef;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser},
        jwt::{JwtKeys, TokenKind},
        password::{hash_password, verify_password},
        repo_types::{normalize_email, PasswordResetToken, User},
        validate::{check_password_strength, check_school_email, is_valid_email},
    },
    error::{AppError, AppResult},
    state::AppState,
};

const BAD_CREDENTIALS: &str = "Invalid email or password";
const BAD_RESET_TOKEN: &str = "Invalid or expired reset token";

pub async fn register(st: &AppState, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email);
    check_school_email(&email)?;
    check_password_strength(password)?;

    let hash = hash_password(password)?;
    let user = User::create(&st.db, User::new(&email, hash)).await?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Unknown email and wrong password produce the same error.
pub async fn login(st: &AppState, email: &str, password: &str) -> AppResult<User> {
    let Some(user) = User::find_by_email(&st.db, email).await else {
        warn!(email = %normalize_email(email), "login unknown email");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };

    if password.is_empty() || !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(AppError::unauthorized("Account is inactive"));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(user)
}

pub fn issue_tokens(st: &AppState, user: &User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(st);
    Ok(AuthResponse {
        access_token: keys.issue(user.id, TokenKind::Access)?,
        refresh_token: keys.issue(user.id, TokenKind::Refresh)?,
        user: PublicUser::from(user),
    })
}

pub async fn refresh(st: &AppState, refresh_token: &str) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(st);
    let student = keys
        .student_for(refresh_token, TokenKind::Refresh)
        .map_err(|e| AppError::unauthorized(e.to_string()))?;
    let user = current_user(st, student).await?;
    issue_tokens(st, &user)
}

/// The user behind a verified token; a deleted account counts as logged out.
pub async fn current_user(st: &AppState, user_id: Uuid) -> AppResult<User> {
    User::find_by_id(&st.db, user_id)
        .await
        .ok_or_else(|| AppError::unauthorized("User not found"))
}

pub async fn search_by_email(st: &AppState, email: &str) -> AppResult<User> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email parameter required"));
    }
    User::find_by_email(&st.db, email)
        .await
        .ok_or_else(|| AppError::not_found("Student not found"))
}

/// Issue a reset token for `email`. Returns `None` for unknown addresses so
/// the reply does not reveal which accounts exist.
pub async fn request_password_reset(
    st: &AppState,
    email: &str,
) -> AppResult<Option<PasswordResetToken>> {
    ensure_reset_enabled(st)?;

    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format"));
    }

    let Some(user) = User::find_by_email(&st.db, &email).await else {
        info!("password reset requested for unknown email");
        return Ok(None);
    };

    let purged = PasswordResetToken::purge_invalid(&st.db, OffsetDateTime::now_utc()).await?;
    if purged > 0 {
        info!(purged, "purged stale reset tokens");
    }

    let ttl = Duration::minutes(st.config.reset.ttl_minutes);
    let token = PasswordResetToken::create(&st.db, PasswordResetToken::issue(user.id, ttl)).await?;
    info!(user_id = %user.id, expires_at = %token.expires_at, "reset token issued");
    Ok(Some(token))
}

pub async fn reset_password(st: &AppState, token: &str, new_password: &str) -> AppResult<User> {
    ensure_reset_enabled(st)?;

    if token.is_empty() {
        return Err(AppError::validation("Reset token is required"));
    }
    check_password_strength(new_password)?;

    let stored = PasswordResetToken::find_by_token(&st.db, token)
        .await
        .ok_or_else(|| AppError::validation(BAD_RESET_TOKEN))?;
    if !stored.is_valid_at(OffsetDateTime::now_utc()) {
        warn!(user_id = %stored.user_id, used = stored.is_used, "stale reset token presented");
        return Err(AppError::validation(BAD_RESET_TOKEN));
    }

    if User::find_by_id(&st.db, stored.user_id).await.is_none() {
        return Err(AppError::validation("User not found"));
    }

    // Burn the token before touching the password so a failed write cannot
    // leave it reusable.
    PasswordResetToken::mark_used(&st.db, stored.id).await?;
    let hash = hash_password(new_password)?;
    let user = User::set_password_hash(&st.db, stored.user_id, hash).await?;
    info!(user_id = %user.id, "password reset");
    Ok(user)
}

fn ensure_reset_enabled(st: &AppState) -> AppResult<()> {
    if st.config.reset.enabled {
        Ok(())
    } else {
        Err(AppError::Unavailable(
            "Password reset service is currently unavailable".into(),
        ))
    }
}
