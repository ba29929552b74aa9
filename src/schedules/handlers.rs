use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{CreateScheduleRequest, ScheduleIdRequest},
    repo_types::StudySession,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    response::{done, ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/study_schedule/create", post(create_schedule))
        .route("/study_schedule/get", get(get_schedule))
        .route("/study_schedule/delete", post(delete_schedule))
}

#[instrument(skip(state, payload))]
pub async fn create_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateScheduleRequest>,
) -> ApiReply<Vec<StudySession>> {
    let created = services::create_schedule(
        &state,
        user_id,
        &payload.session_name,
        &payload.start_date,
        &payload.end_date,
        payload.group_id,
    )
    .await?;
    ok("Study schedule created successfully!", created)
}

#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Vec<StudySession>> {
    ok(
        "Study schedule retrieved successfully!",
        services::list_for_user(&state, user_id).await,
    )
}

#[instrument(skip(state, payload))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ScheduleIdRequest>,
) -> ApiReply<()> {
    let id = payload
        .id
        .ok_or_else(|| AppError::validation("Session id is required"))?;
    services::delete_schedule(&state, user_id, id).await?;
    done("Study session deleted")
}
