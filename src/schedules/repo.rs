use uuid::Uuid;

use super::repo_types::StudySession;
use crate::{db::Db, error::AppResult};

impl StudySession {
    pub async fn create(db: &Db, s: StudySession) -> AppResult<StudySession> {
        db.schedules.insert(s).await
    }

    /// Ordered by start time.
    pub async fn list_for_user(db: &Db, user_id: Uuid) -> Vec<StudySession> {
        let mut out = db.schedules.filter(|s| s.user_id == user_id).await;
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        out
    }

    pub async fn find_owned(db: &Db, user_id: Uuid, id: Uuid) -> Option<StudySession> {
        db.schedules.get(id).await.filter(|s| s.user_id == user_id)
    }

    pub async fn delete(db: &Db, id: Uuid) -> AppResult<StudySession> {
        db.schedules.remove(id).await
    }
}
