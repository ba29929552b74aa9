use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{chats::dto::ChatSummary, profiles::dto::ProfileSummary};

#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestIdBody {
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct FriendIdBody {
    pub friend_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PendingRequest {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct PendingRequests {
    pub received: Vec<PendingRequest>,
    pub sent: Vec<PendingRequest>,
}

#[derive(Debug, Serialize)]
pub struct FriendView {
    pub id: Uuid,
    pub email: String,
    pub profile: Option<ProfileSummary>,
    pub chats: Vec<ChatSummary>,
}
