use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Blocked,
}

/// Relationship between two users. `user_id` is the requester (or the
/// blocker), `friend_id` the other side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: FriendStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Friendship {
    pub fn new(user_id: Uuid, friend_id: Uuid, status: FriendStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            friend_id,
            status,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.friend_id == user_id
    }

    /// Same unordered pair of users.
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.user_id == a && self.friend_id == b) || (self.user_id == b && self.friend_id == a)
    }

    pub fn other(&self, user_id: Uuid) -> Uuid {
        if self.user_id == user_id {
            self.friend_id
        } else {
            self.user_id
        }
    }
}

impl Record for Friendship {
    const ENTITY: &'static str = "Friendship";
    fn id(&self) -> Uuid {
        self.id
    }
}
