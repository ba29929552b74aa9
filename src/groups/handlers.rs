use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{
        CreateGroupRequest, EditGroupRequest, FilterRequest, GroupRefRequest, GroupView,
        LeaveGroupResponse,
    },
    repo_types::Group,
    services::{self, GroupChanges},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    response::{ok, ApiJson, ApiReply},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/group/create", post(create_group))
        .route("/group/join", post(join_group))
        .route("/group/leave", post(leave_group))
        .route("/group/edit", post(edit_group))
        .route("/group/filter", post(filter_groups))
        .route("/group/list", get(list_groups))
        .route("/group/listall", get(list_all_groups))
}

fn require_ref(group_id: Option<String>) -> AppResult<String> {
    group_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::validation("Group ID or name is required"))
}

async fn views(state: &AppState, groups: Vec<Group>) -> Vec<GroupView> {
    let mut out = Vec::with_capacity(groups.len());
    for g in groups {
        out.push(services::view(state, g).await);
    }
    out
}

#[instrument(skip(state, payload))]
pub async fn create_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateGroupRequest>,
) -> ApiReply<GroupView> {
    let group = services::create_group(
        &state,
        user_id,
        &payload.name,
        &payload.members,
        payload.study_times.map(|t| t.into_vec()).unwrap_or_default(),
        payload.specified_class.map(|c| c.joined()).unwrap_or_default(),
    )
    .await?;
    let message = format!("Group {} created successfully!", group.name);
    ok(message, services::view(&state, group).await)
}

#[instrument(skip(state, payload))]
pub async fn join_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<GroupRefRequest>,
) -> ApiReply<GroupView> {
    let ident = require_ref(payload.group_id)?;
    let group = services::join_group(&state, user_id, &ident).await?;
    let message = format!("Group {} joined successfully!", group.name);
    ok(message, services::view(&state, group).await)
}

#[instrument(skip(state, payload))]
pub async fn leave_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<GroupRefRequest>,
) -> ApiReply<LeaveGroupResponse> {
    let ident = require_ref(payload.group_id)?;
    let group = match services::leave_group(&state, user_id, &ident).await? {
        Some(g) => Some(services::view(&state, g).await),
        None => None,
    };
    ok(
        "You have left the group.",
        LeaveGroupResponse {
            group_deleted: group.is_none(),
            group,
        },
    )
}

#[instrument(skip(state, payload))]
pub async fn edit_group(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<EditGroupRequest>,
) -> ApiReply<GroupView> {
    let ident = require_ref(payload.group_id)?;
    let changes = GroupChanges {
        name: payload.name,
        study_times: payload.study_times.map(|t| t.into_vec()),
        specified_class: payload.specified_class.map(|c| c.joined()),
    };
    let group = services::edit_group(&state, user_id, &ident, changes).await?;
    ok("Group updated successfully!", services::view(&state, group).await)
}

#[instrument(skip(state, payload))]
pub async fn filter_groups(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    ApiJson(payload): ApiJson<FilterRequest>,
) -> ApiReply<Vec<GroupView>> {
    let groups = services::filter_groups(&state, &payload.kind, &payload.value).await?;
    ok("Groups filtered successfully!", views(&state, groups).await)
}

#[instrument(skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiReply<Vec<GroupView>> {
    let groups = services::list_user_groups(&state, user_id).await;
    ok("Groups retrieved", views(&state, groups).await)
}

#[instrument(skip(state))]
pub async fn list_all_groups(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> ApiReply<Vec<GroupView>> {
    let groups = services::list_all_groups(&state).await;
    ok("Groups retrieved", views(&state, groups).await)
}
