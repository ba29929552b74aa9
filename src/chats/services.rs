use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::ChatView,
    repo_types::{Chat, ChatKind},
};
use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
    groups::repo_types::Group,
    notifications::services::notify,
    state::AppState,
};

pub async fn create_chat(
    st: &AppState,
    owner_id: Uuid,
    name: &str,
    members: &[Uuid],
) -> AppResult<Chat> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Chat name is required"));
    }
    ensure_users_exist(st, members).await?;

    let chat = Chat::create(
        &st.db,
        Chat::new(Uuid::new_v4(), name, ChatKind::Group, owner_id, members),
    )
    .await?;
    info!(chat_id = %chat.chat_id, %owner_id, members = chat.members.len(), "chat created");
    notify(st, owner_id, format!("You created a Chat {}", chat.name)).await;
    Ok(chat)
}

pub async fn join_chat(st: &AppState, user_id: Uuid, chat_id: Uuid) -> AppResult<Chat> {
    ensure_not_group_backed(st, chat_id).await?;
    let chat = st
        .db
        .chats
        .modify(chat_id, |c| {
            if c.kind == ChatKind::Direct {
                return Err(AppError::validation("Cannot join a direct chat"));
            }
            c.add_member(user_id)
        })
        .await?;
    info!(%chat_id, %user_id, "joined chat");

    let who = display_name(st, user_id).await;
    for member in &chat.members {
        let msg = if *member == user_id {
            format!("You joined a Chat {}!", chat.name)
        } else {
            format!("{who} joined a Chat {}!", chat.name)
        };
        notify(st, *member, msg).await;
    }
    Ok(chat)
}

/// Leave a chat; the chat is deleted once nobody is left. Returns the chat
/// as it stands afterwards, `None` when it was deleted.
pub async fn leave_chat(st: &AppState, user_id: Uuid, chat_id: Uuid) -> AppResult<Option<Chat>> {
    ensure_not_group_backed(st, chat_id).await?;
    let (chat, deleted) = remove_member(st, user_id, chat_id).await?;

    notify(st, user_id, format!("You left a Chat {}!", chat.name)).await;
    let who = display_name(st, user_id).await;
    for member in &chat.members {
        notify(st, *member, format!("{who} left a Chat {}!", chat.name)).await;
    }
    Ok((!deleted).then_some(chat))
}

/// The direct chat between two users, created on first use.
pub async fn open_direct(st: &AppState, a: Uuid, b: Uuid) -> AppResult<Chat> {
    if let Some(existing) = Chat::find_direct(&st.db, a, b).await {
        return Ok(existing);
    }
    let emails = User::emails_for(&st.db, &[a, b]).await;
    let name = emails.join(" & ");
    let chat = Chat::create(
        &st.db,
        Chat::new(Uuid::new_v4(), &name, ChatKind::Direct, a, &[b]),
    )
    .await?;
    info!(chat_id = %chat.chat_id, "direct chat opened");
    Ok(chat)
}

pub async fn send_message(
    st: &AppState,
    user_id: Uuid,
    chat_id: Uuid,
    body: &str,
) -> AppResult<Chat> {
    let sender_email = display_name(st, user_id).await;
    let chat = st
        .db
        .chats
        .modify(chat_id, |c| c.post(user_id, &sender_email, body).map(|_| ()))
        .await?;
    info!(%chat_id, %user_id, "message sent");

    for member in chat.members.iter().filter(|m| **m != user_id) {
        notify(
            st,
            *member,
            format!("{sender_email} just sent a message in {}!", chat.name),
        )
        .await;
    }
    Ok(chat)
}

pub async fn get_chat(st: &AppState, user_id: Uuid, chat_id: Uuid) -> AppResult<Chat> {
    let chat = Chat::find_by_id(&st.db, chat_id)
        .await
        .ok_or_else(|| AppError::not_found("Chat not found"))?;
    if !chat.is_member(user_id) {
        return Err(AppError::validation("User not in chat"));
    }
    Ok(chat)
}

pub async fn list_user_chats(st: &AppState, user_id: Uuid) -> Vec<Chat> {
    Chat::list_for_member(&st.db, user_id).await
}

pub async fn view(st: &AppState, chat: Chat) -> ChatView {
    let emails = User::emails_for(&st.db, &chat.members).await;
    ChatView::new(chat, emails)
}

// Mirroring of group changes onto the group's chat. These run after the group
// itself was saved, so failures are only logged.

pub async fn mirror_group_created(
    st: &AppState,
    group_id: Uuid,
    name: &str,
    owner_id: Uuid,
    members: &[Uuid],
) {
    let chat = Chat::new(group_id, name, ChatKind::Group, owner_id, members);
    if let Err(e) = Chat::create(&st.db, chat).await {
        warn!(error = %e, %group_id, "group chat not created");
    }
}

pub async fn mirror_group_joined(st: &AppState, group_id: Uuid, user_id: Uuid) {
    if let Err(e) = st.db.chats.modify(group_id, |c| c.add_member(user_id)).await {
        warn!(error = %e, %group_id, %user_id, "group chat join not mirrored");
    }
}

pub async fn mirror_group_left(st: &AppState, group_id: Uuid, user_id: Uuid) {
    if let Err(e) = remove_member(st, user_id, group_id).await {
        warn!(error = %e, %group_id, %user_id, "group chat leave not mirrored");
    }
}

pub async fn mirror_group_renamed(st: &AppState, group_id: Uuid, name: &str) {
    let res = st
        .db
        .chats
        .modify(group_id, |c| {
            c.name = name.to_string();
            Ok(())
        })
        .await;
    if let Err(e) = res {
        warn!(error = %e, %group_id, "group chat rename not mirrored");
    }
}

/// Returns the chat after removal and whether it was deleted for being empty.
async fn remove_member(st: &AppState, user_id: Uuid, chat_id: Uuid) -> AppResult<(Chat, bool)> {
    let (chat, deleted) = st
        .db
        .chats
        .modify_or_remove(chat_id, |c| c.remove_member(user_id), |c| c.members.is_empty())
        .await?;
    info!(%chat_id, %user_id, "left chat");
    if deleted {
        info!(%chat_id, "empty chat deleted");
    }
    Ok((chat, deleted))
}

/// Membership of a group's chat only moves with the group itself.
async fn ensure_not_group_backed(st: &AppState, chat_id: Uuid) -> AppResult<()> {
    if Group::find_by_id(&st.db, chat_id).await.is_some() {
        return Err(AppError::validation("Use the group to join or leave its chat"));
    }
    Ok(())
}

async fn ensure_users_exist(st: &AppState, ids: &[Uuid]) -> AppResult<()> {
    for id in ids {
        if User::find_by_id(&st.db, *id).await.is_none() {
            return Err(AppError::validation(format!("Unknown member: {id}")));
        }
    }
    Ok(())
}

async fn display_name(st: &AppState, user_id: Uuid) -> String {
    User::emails_for(&st.db, &[user_id])
        .await
        .pop()
        .unwrap_or_else(|| user_id.to_string())
}
