use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{FriendView, PendingRequest, PendingRequests},
    repo_types::{FriendStatus, Friendship},
};
use crate::{
    auth::repo_types::User,
    chats::{dto::ChatSummary, repo_types::Chat, services as chats},
    error::{AppError, AppResult},
    notifications::services::notify,
    profiles::{dto::ProfileSummary, repo_types::Profile},
    state::AppState,
};

pub async fn send_request(st: &AppState, user_id: Uuid, email: &str) -> AppResult<Friendship> {
    let me = User::find_by_id(&st.db, user_id)
        .await
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if email.trim().is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    let target = User::find_by_email(&st.db, email)
        .await
        .ok_or_else(|| AppError::not_found("No user found with that email address"))?;
    if target.id == me.id {
        return Err(AppError::validation("Cannot send a friend request to yourself"));
    }

    if let Some(existing) = Friendship::find_between(&st.db, me.id, target.id).await {
        warn!(%user_id, friend_id = %target.id, status = ?existing.status, "duplicate friend request");
        return Err(AppError::validation(match existing.status {
            FriendStatus::Pending => "Friend request already sent or received",
            FriendStatus::Accepted => "Already friends with this user",
            FriendStatus::Blocked => "Cannot send a friend request to this user",
        }));
    }

    let request = Friendship::create(
        &st.db,
        Friendship::new(me.id, target.id, FriendStatus::Pending),
    )
    .await?;
    info!(request_id = %request.id, %user_id, friend_id = %target.id, "friend request sent");
    notify(st, target.id, format!("{} sent you a friend request", me.email)).await;
    Ok(request)
}

/// Accept a pending request addressed to `user_id`, then open a direct chat
/// between both users.
pub async fn accept_request(st: &AppState, user_id: Uuid, request_id: Uuid) -> AppResult<Friendship> {
    let request = pending_for(st, user_id, request_id, "You cannot accept this friend request").await?;
    let accepted = Friendship::update(
        &st.db,
        Friendship {
            status: FriendStatus::Accepted,
            ..request
        },
    )
    .await?;
    info!(%request_id, %user_id, "friend request accepted");

    if let Err(e) = chats::open_direct(st, accepted.user_id, accepted.friend_id).await {
        warn!(error = %e, %request_id, "direct chat not opened");
    }
    let who = email_of(st, user_id).await;
    notify(st, accepted.user_id, format!("{who} accepted your friend request")).await;
    Ok(accepted)
}

pub async fn reject_request(st: &AppState, user_id: Uuid, request_id: Uuid) -> AppResult<()> {
    pending_for(st, user_id, request_id, "You cannot reject this friend request").await?;
    Friendship::remove(&st.db, request_id).await?;
    info!(%request_id, %user_id, "friend request rejected");
    Ok(())
}

/// Block another user, replacing whatever relationship existed.
pub async fn block_user(st: &AppState, user_id: Uuid, other_id: Uuid) -> AppResult<Friendship> {
    if user_id == other_id {
        return Err(AppError::validation("Cannot block yourself"));
    }
    if User::find_by_id(&st.db, other_id).await.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    let blocked = match Friendship::find_between(&st.db, user_id, other_id).await {
        Some(existing) => {
            Friendship::update(
                &st.db,
                Friendship {
                    user_id,
                    friend_id: other_id,
                    status: FriendStatus::Blocked,
                    ..existing
                },
            )
            .await?
        }
        None => {
            Friendship::create(
                &st.db,
                Friendship::new(user_id, other_id, FriendStatus::Blocked),
            )
            .await?
        }
    };
    info!(%user_id, %other_id, "user blocked");
    Ok(blocked)
}

/// Pending requests received and sent; requests whose other side no longer
/// exists are left out.
pub async fn pending_requests(st: &AppState, user_id: Uuid) -> PendingRequests {
    let received = Friendship::pending_received(&st.db, user_id).await;
    let sent = Friendship::pending_sent(&st.db, user_id).await;
    PendingRequests {
        received: describe(st, received, user_id).await,
        sent: describe(st, sent, user_id).await,
    }
}

pub async fn list_friends(st: &AppState, user_id: Uuid) -> Vec<FriendView> {
    let mut out = Vec::new();
    for friend_id in Friendship::friend_ids(&st.db, user_id).await {
        let Some(friend) = User::find_by_id(&st.db, friend_id).await else {
            continue;
        };
        let profile = Profile::find_by_user_id(&st.db, friend_id)
            .await
            .map(ProfileSummary::from);
        let chats = Chat::list_for_member(&st.db, friend_id)
            .await
            .iter()
            .map(ChatSummary::from)
            .collect();
        out.push(FriendView {
            id: friend.id,
            email: friend.email,
            profile,
            chats,
        });
    }
    out
}

/// End a friendship from either side.
pub async fn remove_friend(st: &AppState, user_id: Uuid, friend_id: Uuid) -> AppResult<()> {
    let friendship = Friendship::find_between(&st.db, user_id, friend_id)
        .await
        .filter(|f| f.status == FriendStatus::Accepted)
        .ok_or_else(|| AppError::not_found("Friendship not found"))?;
    Friendship::remove(&st.db, friendship.id).await?;
    info!(%user_id, %friend_id, "friend removed");
    Ok(())
}

async fn pending_for(
    st: &AppState,
    user_id: Uuid,
    request_id: Uuid,
    not_recipient: &str,
) -> AppResult<Friendship> {
    let request = Friendship::find_by_id(&st.db, request_id)
        .await
        .ok_or_else(|| AppError::not_found("Friend request not found"))?;
    if request.friend_id != user_id {
        warn!(%request_id, %user_id, "friend request answered by non-recipient");
        return Err(AppError::validation(not_recipient));
    }
    if request.status != FriendStatus::Pending {
        return Err(AppError::validation("This friend request is not pending"));
    }
    Ok(request)
}

async fn describe(st: &AppState, requests: Vec<Friendship>, user_id: Uuid) -> Vec<PendingRequest> {
    let mut out = Vec::with_capacity(requests.len());
    for r in requests {
        let other = r.other(user_id);
        match User::find_by_id(&st.db, other).await {
            Some(u) => out.push(PendingRequest {
                request_id: r.id,
                user_id: u.id,
                email: u.email,
                created_at: r.created_at,
            }),
            None => warn!(request_id = %r.id, %other, "friend request from missing user skipped"),
        }
    }
    out
}

async fn email_of(st: &AppState, user_id: Uuid) -> String {
    User::emails_for(&st.db, &[user_id])
        .await
        .pop()
        .unwrap_or_else(|| user_id.to_string())
}
