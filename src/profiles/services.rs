use tracing::info;
use uuid::Uuid;

use super::{dto::UploadProfileRequest, repo_types::Profile};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Create the caller's profile, or apply the provided fields to the existing one.
pub async fn upload_profile(
    st: &AppState,
    user_id: Uuid,
    changes: &UploadProfileRequest,
) -> AppResult<Profile> {
    let existing = Profile::find_by_user_id(&st.db, user_id).await;
    let is_new = existing.is_none();
    let mut profile = existing.unwrap_or_else(|| Profile::new(user_id));

    if let Some(name) = &changes.name {
        profile.set_name(name)?;
    }
    if let Some(major) = &changes.major {
        profile.set_major(major)?;
    }
    if let Some(slots) = &changes.availability {
        profile.set_availability(slots);
    }

    let profile = if is_new {
        Profile::create(&st.db, profile).await?
    } else {
        Profile::update(&st.db, profile).await?
    };
    info!(profile_id = %profile.id, %user_id, created = is_new, "profile saved");
    Ok(profile)
}

pub async fn get_profile(st: &AppState, user_id: Uuid) -> AppResult<Profile> {
    Profile::find_by_user_id(&st.db, user_id)
        .await
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

/// Set the preferred hours for one weekday, creating an empty profile first
/// when the user has none.
pub async fn set_preference(
    st: &AppState,
    user_id: Uuid,
    day: i64,
    start: i64,
    end: i64,
) -> AppResult<Profile> {
    match Profile::find_by_user_id(&st.db, user_id).await {
        Some(profile) => {
            st.db
                .profiles
                .modify(profile.id, |p| p.set_preference(day, start, end))
                .await
        }
        None => {
            let mut profile = Profile::new(user_id);
            profile.set_preference(day, start, end)?;
            Profile::create(&st.db, profile).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(name: Option<&str>, major: Option<&str>) -> UploadProfileRequest {
        UploadProfileRequest {
            name: name.map(Into::into),
            major: major.map(Into::into),
            availability: None,
        }
    }

    #[tokio::test]
    async fn upload_creates_then_partially_updates() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let user = Uuid::new_v4();

        let created = upload_profile(&st, user, &changes(Some("Ada"), Some("CS")))
            .await
            .unwrap();
        let updated = upload_profile(&st, user, &changes(None, Some("Math")))
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.name.as_deref(), Some("Ada"));
        assert_eq!(updated.major.as_deref(), Some("Math"));
        assert_eq!(st.db.profiles.all().await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_update_keeps_stored_profile() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let user = Uuid::new_v4();
        upload_profile(&st, user, &changes(Some("Ada"), None)).await.unwrap();

        let err = upload_profile(&st, user, &changes(Some(" "), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            get_profile(&st, user).await.unwrap().name.as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let err = get_profile(&st, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn preference_creates_profile_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let user = Uuid::new_v4();

        let p = set_preference(&st, user, 0, 8, 12).await.unwrap();
        assert_eq!((p.preferences[0], p.preferences[7]), (8, 12));

        let p = set_preference(&st, user, 1, 13, 15).await.unwrap();
        assert_eq!(p.preferences[0], 8);
        assert_eq!((p.preferences[1], p.preferences[8]), (13, 15));

        assert!(set_preference(&st, user, 1, 15, 13).await.is_err());
        assert_eq!(get_profile(&st, user).await.unwrap().preferences[1], 13);
    }
}
