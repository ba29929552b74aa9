use std::path::Path;

use anyhow::Context;

use crate::{
    auth::repo_types::{PasswordResetToken, User},
    chats::repo_types::Chat,
    friends::repo_types::Friendship,
    groups::repo_types::Group,
    notifications::repo_types::Notification,
    profiles::repo_types::Profile,
    schedules::repo_types::StudySession,
    store::JsonTable,
};

/// Every table of the application, one JSON file each under the data dir.
pub struct Db {
    pub users: JsonTable<User>,
    pub reset_tokens: JsonTable<PasswordResetToken>,
    pub profiles: JsonTable<Profile>,
    pub groups: JsonTable<Group>,
    pub friends: JsonTable<Friendship>,
    pub chats: JsonTable<Chat>,
    pub notifications: JsonTable<Notification>,
    pub schedules: JsonTable<StudySession>,
}

impl Db {
    pub async fn open(dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create data dir {}", dir.display()))?;
        Ok(Self {
            users: JsonTable::open(dir.join("users.json")).await?,
            reset_tokens: JsonTable::open(dir.join("password_reset_tokens.json")).await?,
            profiles: JsonTable::open(dir.join("profiles.json")).await?,
            groups: JsonTable::open(dir.join("groups.json")).await?,
            friends: JsonTable::open(dir.join("friends.json")).await?,
            chats: JsonTable::open(dir.join("chats.json")).await?,
            notifications: JsonTable::open(dir.join("notifications.json")).await?,
            schedules: JsonTable::open(dir.join("schedules.json")).await?,
        })
    }
}
