use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub fn new(user_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message: message.into(),
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Record for Notification {
    const ENTITY: &'static str = "Notification";
    fn id(&self) -> Uuid {
        self.id
    }
}
