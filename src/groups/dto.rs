use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Group, OneOrMany};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<Uuid>,
    pub study_times: Option<OneOrMany>,
    pub specified_class: Option<OneOrMany>,
}

/// `group_id` may hold a group id or a group name.
#[derive(Debug, Deserialize)]
pub struct GroupRefRequest {
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditGroupRequest {
    pub group_id: Option<String>,
    pub name: Option<String>,
    pub study_times: Option<OneOrMany>,
    pub specified_class: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub members: Vec<Uuid>,
    pub member_emails: Vec<String>,
    pub study_times: Vec<String>,
    pub specified_class: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl GroupView {
    pub fn new(g: Group, member_emails: Vec<String>) -> Self {
        Self {
            id: g.id,
            name: g.name,
            owner_id: g.owner_id,
            members: g.members,
            member_emails,
            study_times: g.study_times,
            specified_class: g.specified_class,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveGroupResponse {
    pub group_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupView>,
}
