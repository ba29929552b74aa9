use uuid::Uuid;

use super::repo_types::Group;
use crate::{db::Db, error::AppResult};

impl Group {
    /// Persist a new group; names are unique ignoring case.
    pub async fn create(db: &Db, group: Group) -> AppResult<Group> {
        let name = group.name.to_lowercase();
        db.groups
            .insert_unless(
                group,
                |g| g.name.to_lowercase() == name,
                "A group with this name already exists",
            )
            .await
    }

    pub async fn find_by_id(db: &Db, id: Uuid) -> Option<Group> {
        db.groups.get(id).await
    }

    pub async fn find_by_name(db: &Db, name: &str) -> Option<Group> {
        let name = name.trim().to_lowercase();
        db.groups.find(|g| g.name.to_lowercase() == name).await
    }

    /// Look a group up by id, falling back to its name.
    pub async fn find_by_id_or_name(db: &Db, ident: &str) -> Option<Group> {
        if let Ok(id) = Uuid::parse_str(ident.trim()) {
            if let Some(g) = Self::find_by_id(db, id).await {
                return Some(g);
            }
        }
        Self::find_by_name(db, ident).await
    }

    pub async fn list_for_member(db: &Db, user_id: Uuid) -> Vec<Group> {
        sorted(db.groups.filter(|g| g.is_member(user_id)).await)
    }

    pub async fn list_all(db: &Db) -> Vec<Group> {
        sorted(db.groups.all().await)
    }

    pub async fn filter_by_class(db: &Db, class: &str) -> Vec<Group> {
        sorted(db.groups.filter(|g| g.matches_class(class)).await)
    }

    pub async fn filter_by_study_time(db: &Db, time: &str) -> Vec<Group> {
        sorted(db.groups.filter(|g| g.matches_study_time(time)).await)
    }

    /// Drop `user_id` from the group, deleting the group in the same write
    /// when nobody is left. The flag is true when it was deleted.
    pub async fn leave(db: &Db, id: Uuid, user_id: Uuid) -> AppResult<(Group, bool)> {
        db.groups
            .modify_or_remove(id, |g| g.remove_member(user_id), |g| g.members.is_empty())
            .await
    }

    /// Edit a group in place; a name clash with another group is refused
    /// after `f` has run.
    pub async fn edit(
        db: &Db,
        id: Uuid,
        f: impl FnOnce(&mut Group) -> AppResult<()>,
    ) -> AppResult<Group> {
        db.groups
            .modify_unless(
                id,
                f,
                |other, g| other.name.to_lowercase() == g.name.to_lowercase(),
                "A group with this name already exists",
            )
            .await
    }
}

fn sorted(mut groups: Vec<Group>) -> Vec<Group> {
    groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    groups
}
