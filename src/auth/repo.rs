use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{normalize_email, PasswordResetToken, User},
    db::Db,
    error::AppResult,
};

impl User {
    /// Find a user by email, ignoring case and surrounding whitespace.
    pub async fn find_by_email(db: &Db, email: &str) -> Option<User> {
        let email = normalize_email(email);
        db.users.find(|u| u.email == email).await
    }

    pub async fn find_by_id(db: &Db, id: Uuid) -> Option<User> {
        db.users.get(id).await
    }

    /// Persist a new user; the email must not be registered yet.
    pub async fn create(db: &Db, user: User) -> AppResult<User> {
        let email = user.email.clone();
        db.users
            .insert_unless(user, |u| u.email == email, "User with this email already exists")
            .await
    }

    pub async fn set_password_hash(db: &Db, id: Uuid, hash: String) -> AppResult<User> {
        db.users
            .modify(id, |u| {
                u.password_hash = hash;
                Ok(())
            })
            .await
    }

    /// Emails for the given ids, falling back to the id for unknown users.
    pub async fn emails_for(db: &Db, ids: &[Uuid]) -> Vec<String> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match db.users.get(*id).await {
                Some(u) => out.push(u.email),
                None => out.push(id.to_string()),
            }
        }
        out
    }
}

impl PasswordResetToken {
    pub async fn create(db: &Db, token: PasswordResetToken) -> AppResult<PasswordResetToken> {
        db.reset_tokens.insert(token).await
    }

    pub async fn find_by_token(db: &Db, token: &str) -> Option<PasswordResetToken> {
        db.reset_tokens.find(|t| t.token == token).await
    }

    pub async fn mark_used(db: &Db, id: Uuid) -> AppResult<PasswordResetToken> {
        db.reset_tokens
            .modify(id, |t| {
                t.is_used = true;
                Ok(())
            })
            .await
    }

    /// Delete expired and used tokens, returning how many went away.
    pub async fn purge_invalid(db: &Db, now: OffsetDateTime) -> AppResult<usize> {
        db.reset_tokens.remove_where(|t| !t.is_valid_at(now)).await
    }
}
