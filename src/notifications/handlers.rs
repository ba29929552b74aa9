use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{dto::NotificationIdRequest, repo_types::Notification, services};
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    response::{done, ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list))
        .route("/notifications/read", post(mark_read))
        .route("/notifications/delete", post(delete))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Vec<Notification>> {
    ok(
        "Notifications retrieved",
        services::list_for_user(&state, user_id).await,
    )
}

#[instrument(skip(state, payload))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<NotificationIdRequest>,
) -> ApiReply<Notification> {
    let id = payload
        .id
        .ok_or_else(|| AppError::validation("Notification id is required"))?;
    ok(
        "Notification marked as read",
        services::mark_read(&state, user_id, id).await?,
    )
}

#[instrument(skip(state, payload))]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<NotificationIdRequest>,
) -> ApiReply<()> {
    let id = payload
        .id
        .ok_or_else(|| AppError::validation("Notification id is required"))?;
    services::delete(&state, user_id, id).await?;
    done("Notification deleted")
}
