use tracing::info;
use uuid::Uuid;

use super::repo_types::{parse_slot, StudySession};
use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
    groups::services::get_group,
    notifications::services::notify,
    state::AppState,
};

/// Schedule a session. With a group, every member gets their own copy and a
/// notification; otherwise only the caller's calendar changes.
pub async fn create_schedule(
    st: &AppState,
    user_id: Uuid,
    title: &str,
    start: &str,
    end: &str,
    group_id: Option<Uuid>,
) -> AppResult<Vec<StudySession>> {
    if title.trim().is_empty() || start.trim().is_empty() || end.trim().is_empty() {
        return Err(AppError::validation(
            "Session name, start date and end date are required",
        ));
    }
    let (Some(start_time), Some(end_time)) = (parse_slot(start), parse_slot(end)) else {
        return Err(AppError::validation("Invalid format of start time or end time"));
    };
    if start_time >= end_time {
        return Err(AppError::validation("Start time must be before end time"));
    }

    let Some(group_id) = group_id else {
        let session = StudySession::create(
            &st.db,
            StudySession::new(user_id, None, title, start_time, end_time),
        )
        .await?;
        info!(session_id = %session.id, %user_id, "study session created");
        return Ok(vec![session]);
    };

    let group = get_group(st, group_id).await?;
    if !group.is_member(user_id) {
        return Err(AppError::validation("User not in this group"));
    }

    let who = User::emails_for(&st.db, &[user_id])
        .await
        .pop()
        .unwrap_or_else(|| user_id.to_string());
    let span = format!("from {start} to {end}", start = start.trim(), end = end.trim());

    let mut created = Vec::with_capacity(group.members.len());
    for member in &group.members {
        let session = StudySession::create(
            &st.db,
            StudySession::new(*member, Some(group.id), title, start_time, end_time),
        )
        .await?;
        created.push(session);

        let msg = if *member == user_id {
            format!("You created a Study Schedule for Group {} {span}", group.name)
        } else {
            format!("{who} created a Study Schedule for Group {} {span}", group.name)
        };
        notify(st, *member, msg).await;
    }
    info!(%group_id, %user_id, sessions = created.len(), "group study session created");
    Ok(created)
}

pub async fn list_for_user(st: &AppState, user_id: Uuid) -> Vec<StudySession> {
    StudySession::list_for_user(&st.db, user_id).await
}

pub async fn delete_schedule(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<StudySession> {
    StudySession::find_owned(&st.db, user_id, id)
        .await
        .ok_or_else(|| AppError::not_found("Study session not found"))?;
    let session = StudySession::delete(&st.db, id).await?;
    info!(session_id = %id, %user_id, "study session deleted");
    Ok(session)
}
