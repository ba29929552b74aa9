use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Chat, ChatKind, ChatMessage};

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ChatIdRequest {
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: Option<Uuid>,
    #[serde(default)]
    pub message: String,
}

/// Chat as returned to clients, with member emails resolved.
#[derive(Debug, Serialize)]
pub struct ChatView {
    pub chat_id: Uuid,
    pub name: String,
    pub kind: ChatKind,
    pub members: Vec<Uuid>,
    pub member_emails: Vec<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ChatView {
    pub fn new(chat: Chat, member_emails: Vec<String>) -> Self {
        Self {
            chat_id: chat.chat_id,
            name: chat.name,
            kind: chat.kind,
            members: chat.members,
            member_emails,
            messages: chat.messages,
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveChatResponse {
    pub chat_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub chat_id: Uuid,
    pub name: String,
}

impl From<&Chat> for ChatSummary {
    fn from(c: &Chat) -> Self {
        Self {
            chat_id: c.chat_id,
            name: c.name.clone(),
        }
    }
}
