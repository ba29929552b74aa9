use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NotificationIdRequest {
    pub id: Option<Uuid>,
}
