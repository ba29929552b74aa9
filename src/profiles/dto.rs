use serde::{Deserialize, Serialize};

use super::repo_types::Profile;

/// Partial profile update; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UploadProfileRequest {
    pub name: Option<String>,
    pub major: Option<String>,
    pub availability: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub day: Option<i64>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// What friends get to see of a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: Option<String>,
    pub major: Option<String>,
    pub availability: Vec<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(p: Profile) -> Self {
        Self {
            name: p.name,
            major: p.major,
            availability: p.availability,
        }
    }
}
