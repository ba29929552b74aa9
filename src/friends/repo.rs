use uuid::Uuid;

use super::repo_types::{FriendStatus, Friendship};
use crate::{db::Db, error::AppResult};

impl Friendship {
    /// Persist a relationship; at most one per unordered pair.
    pub async fn create(db: &Db, f: Friendship) -> AppResult<Friendship> {
        let (a, b) = (f.user_id, f.friend_id);
        db.friends
            .insert_unless(
                f,
                |o| o.connects(a, b),
                "Friend request already sent or received",
            )
            .await
    }

    pub async fn find_by_id(db: &Db, id: Uuid) -> Option<Friendship> {
        db.friends.get(id).await
    }

    pub async fn find_between(db: &Db, a: Uuid, b: Uuid) -> Option<Friendship> {
        db.friends.find(|f| f.connects(a, b)).await
    }

    pub async fn pending_received(db: &Db, user_id: Uuid) -> Vec<Friendship> {
        db.friends
            .filter(|f| f.friend_id == user_id && f.status == FriendStatus::Pending)
            .await
    }

    pub async fn pending_sent(db: &Db, user_id: Uuid) -> Vec<Friendship> {
        db.friends
            .filter(|f| f.user_id == user_id && f.status == FriendStatus::Pending)
            .await
    }

    pub async fn friend_ids(db: &Db, user_id: Uuid) -> Vec<Uuid> {
        db.friends
            .filter(|f| f.involves(user_id) && f.status == FriendStatus::Accepted)
            .await
            .iter()
            .map(|f| f.other(user_id))
            .collect()
    }

    pub async fn update(db: &Db, f: Friendship) -> AppResult<Friendship> {
        db.friends.update(f).await
    }

    pub async fn remove(db: &Db, id: Uuid) -> AppResult<Friendship> {
        db.friends.remove(id).await
    }
}
