use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{FriendIdBody, FriendRequestBody, FriendView, PendingRequests, RequestIdBody},
    repo_types::Friendship,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    response::{done, ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/friend/request", post(send_request))
        .route("/friend/accept", post(accept_request))
        .route("/friend/reject", post(reject_request))
        .route("/friend/remove", post(remove_friend))
        .route("/friend/block", post(block_user))
        .route("/friend/requests", get(pending_requests))
        .route("/friend/list", get(list_friends))
}

fn required(id: Option<Uuid>, what: &str) -> AppResult<Uuid> {
    id.ok_or_else(|| AppError::validation(format!("{what} is required")))
}

#[instrument(skip(state, payload))]
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<FriendRequestBody>,
) -> ApiReply<Friendship> {
    ok(
        "Friend request sent",
        services::send_request(&state, user_id, &payload.email).await?,
    )
}

#[instrument(skip(state, payload))]
pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<RequestIdBody>,
) -> ApiReply<Friendship> {
    let request_id = required(payload.request_id, "Request ID")?;
    ok(
        "Friend request accepted",
        services::accept_request(&state, user_id, request_id).await?,
    )
}

#[instrument(skip(state, payload))]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<RequestIdBody>,
) -> ApiReply<()> {
    let request_id = required(payload.request_id, "Request ID")?;
    services::reject_request(&state, user_id, request_id).await?;
    done("Friend request rejected")
}

#[instrument(skip(state, payload))]
pub async fn remove_friend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<FriendIdBody>,
) -> ApiReply<()> {
    let friend_id = required(payload.friend_id, "Friend ID")?;
    services::remove_friend(&state, user_id, friend_id).await?;
    done("Friend removed")
}

#[instrument(skip(state, payload))]
pub async fn block_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<FriendIdBody>,
) -> ApiReply<Friendship> {
    let other = required(payload.friend_id, "Friend ID")?;
    ok("User blocked", services::block_user(&state, user_id, other).await?)
}

#[instrument(skip(state))]
pub async fn pending_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<PendingRequests> {
    ok(
        "Friend requests retrieved",
        services::pending_requests(&state, user_id).await,
    )
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Vec<FriendView>> {
    ok("Friends retrieved", services::list_friends(&state, user_id).await)
}
