use uuid::Uuid;

use super::repo_types::Chat;
use crate::{db::Db, error::AppResult};

impl Chat {
    pub async fn create(db: &Db, chat: Chat) -> AppResult<Chat> {
        db.chats.insert(chat).await
    }

    pub async fn find_by_id(db: &Db, chat_id: Uuid) -> Option<Chat> {
        db.chats.get(chat_id).await
    }

    pub async fn list_for_member(db: &Db, user_id: Uuid) -> Vec<Chat> {
        let mut chats = db.chats.filter(|c| c.is_member(user_id)).await;
        chats.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        chats
    }

    pub async fn find_direct(db: &Db, a: Uuid, b: Uuid) -> Option<Chat> {
        db.chats.find(|c| c.is_direct_between(a, b)).await
    }
}
