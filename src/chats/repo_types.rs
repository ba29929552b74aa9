use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::Record,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Mirror of a study group; shares the group's id.
    Group,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: Uuid,
    pub sender_email: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: Uuid,
    pub name: String,
    pub kind: ChatKind,
    pub members: Vec<Uuid>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Chat {
    /// Members are deduplicated with `owner` first.
    pub fn new(chat_id: Uuid, name: &str, kind: ChatKind, owner: Uuid, members: &[Uuid]) -> Self {
        let mut all = vec![owner];
        for m in members {
            if !all.contains(m) {
                all.push(*m);
            }
        }
        Self {
            chat_id,
            name: name.trim().to_string(),
            kind,
            members: all,
            messages: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }

    pub fn add_member(&mut self, user_id: Uuid) -> AppResult<()> {
        if self.is_member(user_id) {
            return Err(AppError::validation("User is in chat"));
        }
        self.members.push(user_id);
        Ok(())
    }

    pub fn remove_member(&mut self, user_id: Uuid) -> AppResult<()> {
        let before = self.members.len();
        self.members.retain(|m| *m != user_id);
        if self.members.len() == before {
            return Err(AppError::validation("User not in chat"));
        }
        Ok(())
    }

    pub fn post(&mut self, sender_id: Uuid, sender_email: &str, body: &str) -> AppResult<&ChatMessage> {
        if !self.is_member(sender_id) {
            return Err(AppError::validation("User not in chat"));
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Message cannot be empty"));
        }
        self.messages.push(ChatMessage {
            sender_id,
            sender_email: sender_email.to_string(),
            body: body.to_string(),
            sent_at: OffsetDateTime::now_utc(),
        });
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// True for the direct chat between exactly these two users.
    pub fn is_direct_between(&self, a: Uuid, b: Uuid) -> bool {
        self.kind == ChatKind::Direct
            && self.members.len() == 2
            && self.is_member(a)
            && self.is_member(b)
    }
}

impl Record for Chat {
    const ENTITY: &'static str = "Chat";
    fn id(&self) -> Uuid {
        self.chat_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_deduplicated_owner_first() {
        let (owner, a) = (Uuid::new_v4(), Uuid::new_v4());
        let chat = Chat::new(Uuid::new_v4(), " Study ", ChatKind::Group, owner, &[a, owner, a]);
        assert_eq!(chat.members, vec![owner, a]);
        assert_eq!(chat.name, "Study");
    }

    #[test]
    fn only_members_post_non_empty_messages() {
        let (owner, outsider) = (Uuid::new_v4(), Uuid::new_v4());
        let mut chat = Chat::new(Uuid::new_v4(), "c", ChatKind::Group, owner, &[]);

        assert_eq!(
            chat.post(outsider, "x@uni.edu", "hi").unwrap_err().to_string(),
            "User not in chat"
        );
        assert!(chat.post(owner, "o@uni.edu", "   ").is_err());
        let msg = chat.post(owner, "o@uni.edu", " hi ").unwrap();
        assert_eq!(msg.body, "hi");
        assert_eq!(chat.messages.len(), 1);
    }

    #[test]
    fn membership_changes_report_no_ops() {
        let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
        let mut chat = Chat::new(Uuid::new_v4(), "c", ChatKind::Direct, owner, &[other]);
        assert!(chat.is_direct_between(other, owner));
        assert_eq!(chat.add_member(other).unwrap_err().to_string(), "User is in chat");
        chat.remove_member(other).unwrap();
        assert_eq!(chat.remove_member(other).unwrap_err().to_string(), "User not in chat");
    }
}
