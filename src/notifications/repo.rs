use uuid::Uuid;

use super::repo_types::Notification;
use crate::{db::Db, error::AppResult};

impl Notification {
    pub async fn create(db: &Db, n: Notification) -> AppResult<Notification> {
        db.notifications.insert(n).await
    }

    /// Newest first.
    pub async fn list_for_user(db: &Db, user_id: Uuid) -> Vec<Notification> {
        let mut out = db.notifications.filter(|n| n.user_id == user_id).await;
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub async fn find_owned(db: &Db, user_id: Uuid, id: Uuid) -> Option<Notification> {
        db.notifications
            .get(id)
            .await
            .filter(|n| n.user_id == user_id)
    }

    pub async fn mark_read(db: &Db, id: Uuid) -> AppResult<Notification> {
        db.notifications
            .modify(id, |n| {
                n.is_read = true;
                Ok(())
            })
            .await
    }

    pub async fn delete(db: &Db, id: Uuid) -> AppResult<Notification> {
        db.notifications.remove(id).await
    }
}
