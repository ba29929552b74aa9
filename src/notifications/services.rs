use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::Notification;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub async fn send(st: &AppState, user_id: Uuid, message: impl Into<String>) -> AppResult<Notification> {
    let n = Notification::create(&st.db, Notification::new(user_id, message)).await?;
    info!(notification_id = %n.id, %user_id, "notification sent");
    Ok(n)
}

/// Fire-and-forget variant used as a side effect of other operations: a
/// failure is logged and swallowed.
pub async fn notify(st: &AppState, user_id: Uuid, message: impl Into<String>) {
    if let Err(e) = send(st, user_id, message).await {
        warn!(error = %e, %user_id, "notification not delivered");
    }
}

pub async fn list_for_user(st: &AppState, user_id: Uuid) -> Vec<Notification> {
    Notification::list_for_user(&st.db, user_id).await
}

pub async fn mark_read(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
    owned(st, user_id, id).await?;
    Notification::mark_read(&st.db, id).await
}

pub async fn delete(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
    owned(st, user_id, id).await?;
    let n = Notification::delete(&st.db, id).await?;
    info!(notification_id = %id, %user_id, "notification deleted");
    Ok(n)
}

// Someone else's notification is reported exactly like a missing one.
async fn owned(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
    Notification::find_owned(&st.db, user_id, id)
        .await
        .ok_or_else(|| AppError::not_found("Notification not found"))
}
