use uuid::Uuid;

use super::repo_types::Profile;
use crate::{db::Db, error::AppResult};

impl Profile {
    pub async fn find_by_user_id(db: &Db, user_id: Uuid) -> Option<Profile> {
        db.profiles.find(|p| p.user_id == user_id).await
    }

    pub async fn create(db: &Db, profile: Profile) -> AppResult<Profile> {
        let user_id = profile.user_id;
        db.profiles
            .insert_unless(
                profile,
                |p| p.user_id == user_id,
                "Profile already exists for this user",
            )
            .await
    }

    pub async fn update(db: &Db, profile: Profile) -> AppResult<Profile> {
        db.profiles.update(profile).await
    }
}
