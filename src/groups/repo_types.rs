use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::Record,
};

/// Study group. `members` is kept in join order and always contains the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub members: Vec<Uuid>,
    #[serde(default)]
    pub study_times: Vec<String>,
    #[serde(default)]
    pub specified_class: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Accepts either a single string or a list of strings in request bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Class lists are stored as one comma separated string.
    pub fn joined(self) -> String {
        self.into_vec().join(", ")
    }
}

impl Group {
    pub fn new(
        name: &str,
        owner_id: Uuid,
        members: &[Uuid],
        study_times: Vec<String>,
        specified_class: String,
    ) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Group name is required"));
        }
        let mut all = vec![owner_id];
        for m in members {
            if !all.contains(m) {
                all.push(*m);
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            members: all,
            study_times,
            specified_class,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }

    pub fn add_member(&mut self, user_id: Uuid) -> AppResult<()> {
        if self.is_member(user_id) {
            return Err(AppError::validation("User already in the group"));
        }
        self.members.push(user_id);
        Ok(())
    }

    /// Remove a member. When the owner leaves, ownership passes to the member
    /// who joined earliest. Leaves `members` empty when the last one leaves.
    pub fn remove_member(&mut self, user_id: Uuid) -> AppResult<()> {
        if !self.is_member(user_id) {
            return Err(AppError::validation("User not in this group"));
        }
        self.members.retain(|m| *m != user_id);
        if self.owner_id == user_id {
            if let Some(next) = self.members.first() {
                self.owner_id = *next;
            }
        }
        Ok(())
    }

    pub fn matches_class(&self, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        !needle.is_empty()
            && self
                .specified_class
                .split(',')
                .any(|c| c.trim().to_lowercase() == needle)
    }

    pub fn matches_study_time(&self, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        !needle.is_empty()
            && self
                .study_times
                .iter()
                .any(|t| t.trim().to_lowercase() == needle)
    }
}

impl Record for Group {
    const ENTITY: &'static str = "Group";
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(owner: Uuid, members: &[Uuid]) -> Group {
        Group::new("CS", owner, members, vec![], String::new()).unwrap()
    }

    #[test]
    fn owner_is_always_a_member_and_members_dedupe() {
        let (owner, a) = (Uuid::new_v4(), Uuid::new_v4());
        let g = group(owner, &[a, a, owner]);
        assert_eq!(g.members, vec![owner, a]);
        assert!(Group::new("  ", owner, &[], vec![], String::new()).is_err());
    }

    #[test]
    fn ownership_passes_to_longest_standing_member() {
        let (owner, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut g = group(owner, &[]);
        g.add_member(a).unwrap();
        g.add_member(b).unwrap();

        g.remove_member(owner).unwrap();
        assert_eq!(g.owner_id, a);
        g.remove_member(b).unwrap();
        assert_eq!(g.owner_id, a);
        g.remove_member(a).unwrap();
        assert!(g.members.is_empty());
    }

    #[test]
    fn membership_errors_use_group_wording() {
        let (owner, stranger) = (Uuid::new_v4(), Uuid::new_v4());
        let mut g = group(owner, &[]);
        assert_eq!(
            g.add_member(owner).unwrap_err().to_string(),
            "User already in the group"
        );
        assert_eq!(
            g.remove_member(stranger).unwrap_err().to_string(),
            "User not in this group"
        );
    }

    #[test]
    fn class_input_accepts_string_or_list() {
        let one: OneOrMany = serde_json::from_str(r#""CS101""#).unwrap();
        let many: OneOrMany = serde_json::from_str(r#"["CS101", " MATH200 ", ""]"#).unwrap();
        assert_eq!(one.joined(), "CS101");
        assert_eq!(many.joined(), "CS101, MATH200");
    }

    #[test]
    fn filters_match_whole_entries_ignoring_case() {
        let g = Group::new(
            "CS",
            Uuid::new_v4(),
            &[],
            vec!["Mon 10:00".into()],
            "CS101, MATH200".into(),
        )
        .unwrap();
        assert!(g.matches_class("math200"));
        assert!(!g.matches_class("CS"));
        assert!(g.matches_study_time("mon 10:00"));
        assert!(!g.matches_study_time(""));
    }
}
