use serde::Deserialize;
use uuid::Uuid;

/// Field names follow the web client's form.
#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    #[serde(default)]
    pub session_name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleIdRequest {
    pub id: Option<Uuid>,
}
