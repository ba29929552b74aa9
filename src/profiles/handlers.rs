use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{PreferenceRequest, UploadProfileRequest},
    repo_types::Profile,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    response::{ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/upload", post(upload_profile))
        .route("/profile/preferences", post(set_preference))
}

#[instrument(skip(state, payload))]
pub async fn upload_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<UploadProfileRequest>,
) -> ApiReply<Profile> {
    ok(
        "Profile updated successfully",
        services::upload_profile(&state, user_id, &payload).await?,
    )
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Profile> {
    ok("Profile retrieved", services::get_profile(&state, user_id).await?)
}

#[instrument(skip(state, payload))]
pub async fn set_preference(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<PreferenceRequest>,
) -> ApiReply<Profile> {
    let (Some(day), Some(start), Some(end)) = (payload.day, payload.start, payload.end) else {
        return Err(AppError::validation("day, start and end are required"));
    };
    ok(
        "Preferences updated",
        services::set_preference(&state, user_id, day, start, end).await?,
    )
}
