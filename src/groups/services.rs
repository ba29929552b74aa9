use tracing::{info, warn};
use uuid::Uuid;

use super::{dto::GroupView, repo_types::Group};
use crate::{
    auth::repo_types::User,
    chats::services as chats,
    error::{AppError, AppResult},
    notifications::services::notify,
    state::AppState,
};

/// Fields of a group that members may change.
#[derive(Debug, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub study_times: Option<Vec<String>>,
    pub specified_class: Option<String>,
}

pub async fn create_group(
    st: &AppState,
    owner_id: Uuid,
    name: &str,
    members: &[Uuid],
    study_times: Vec<String>,
    specified_class: String,
) -> AppResult<Group> {
    let group = Group::new(name, owner_id, members, study_times, specified_class)?;
    for id in &group.members {
        if User::find_by_id(&st.db, *id).await.is_none() {
            warn!(member = %id, "group create with unknown member");
            return Err(AppError::validation(format!("Unknown member: {id}")));
        }
    }

    let group = Group::create(&st.db, group).await?;
    info!(group_id = %group.id, %owner_id, members = group.members.len(), "group created");

    chats::mirror_group_created(st, group.id, &group.name, owner_id, &group.members).await;
    let who = email_of(st, owner_id).await;
    for member in &group.members {
        let msg = if *member == owner_id {
            format!("You created the group {}", group.name)
        } else {
            format!("{who} added you to the group {}", group.name)
        };
        notify(st, *member, msg).await;
    }
    Ok(group)
}

pub async fn join_group(st: &AppState, user_id: Uuid, ident: &str) -> AppResult<Group> {
    let group = resolve(st, ident).await?;
    let group = st
        .db
        .groups
        .modify(group.id, |g| g.add_member(user_id))
        .await?;
    info!(group_id = %group.id, %user_id, "joined group");

    chats::mirror_group_joined(st, group.id, user_id).await;
    let who = email_of(st, user_id).await;
    for member in &group.members {
        let msg = if *member == user_id {
            format!("You joined the group {}", group.name)
        } else {
            format!("{who} joined the group {}", group.name)
        };
        notify(st, *member, msg).await;
    }
    Ok(group)
}

/// Leave a group, deleting it when the last member leaves. Returns the group
/// as it stands afterwards, `None` when it was deleted.
pub async fn leave_group(st: &AppState, user_id: Uuid, ident: &str) -> AppResult<Option<Group>> {
    let before = resolve(st, ident).await?;
    let (group, deleted) = Group::leave(&st.db, before.id, user_id).await?;
    info!(group_id = %group.id, %user_id, "left group");

    chats::mirror_group_left(st, group.id, user_id).await;
    notify(st, user_id, format!("You left the group {}", group.name)).await;

    if deleted {
        info!(group_id = %group.id, "empty group deleted");
        return Ok(None);
    }

    let who = email_of(st, user_id).await;
    for member in &group.members {
        notify(st, *member, format!("{who} left the group {}", group.name)).await;
    }
    if group.owner_id != before.owner_id {
        info!(group_id = %group.id, owner_id = %group.owner_id, "group ownership transferred");
        notify(
            st,
            group.owner_id,
            format!("You are now the owner of the group {}", group.name),
        )
        .await;
    }
    Ok(Some(group))
}

pub async fn edit_group(
    st: &AppState,
    user_id: Uuid,
    ident: &str,
    changes: GroupChanges,
) -> AppResult<Group> {
    let group = resolve(st, ident).await?;

    let renamed = changes.name.is_some();
    let group = Group::edit(&st.db, group.id, |g| {
        if !g.is_member(user_id) {
            return Err(AppError::validation("User not in this group"));
        }
        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Group name is required"));
            }
            g.name = name.to_string();
        }
        if let Some(times) = changes.study_times {
            g.study_times = times;
        }
        if let Some(class) = changes.specified_class {
            g.specified_class = class;
        }
        Ok(())
    })
    .await?;
    info!(group_id = %group.id, %user_id, "group edited");

    if renamed {
        chats::mirror_group_renamed(st, group.id, &group.name).await;
    }
    Ok(group)
}

pub async fn get_group(st: &AppState, id: Uuid) -> AppResult<Group> {
    Group::find_by_id(&st.db, id)
        .await
        .ok_or_else(|| AppError::not_found("Group not found"))
}

pub async fn list_user_groups(st: &AppState, user_id: Uuid) -> Vec<Group> {
    Group::list_for_member(&st.db, user_id).await
}

pub async fn list_all_groups(st: &AppState) -> Vec<Group> {
    Group::list_all(&st.db).await
}

pub async fn filter_groups(st: &AppState, kind: &str, value: &str) -> AppResult<Vec<Group>> {
    if kind.trim().is_empty() || value.trim().is_empty() {
        return Err(AppError::validation("Missing a field"));
    }
    match kind.trim() {
        "class" => Ok(Group::filter_by_class(&st.db, value).await),
        "time" => Ok(Group::filter_by_study_time(&st.db, value).await),
        _ => Err(AppError::validation("Filter type must be 'class' or 'time'")),
    }
}

pub async fn view(st: &AppState, group: Group) -> GroupView {
    let emails = User::emails_for(&st.db, &group.members).await;
    GroupView::new(group, emails)
}

async fn resolve(st: &AppState, ident: &str) -> AppResult<Group> {
    if ident.trim().is_empty() {
        return Err(AppError::validation("Group ID or name is required"));
    }
    Group::find_by_id_or_name(&st.db, ident)
        .await
        .ok_or_else(|| AppError::not_found("Group not found"))
}

async fn email_of(st: &AppState, user_id: Uuid) -> String {
    User::emails_for(&st.db, &[user_id])
        .await
        .pop()
        .unwrap_or_else(|| user_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chats::repo_types::Chat, notifications::repo_types::Notification};

    async fn user(st: &AppState, email: &str) -> Uuid {
        User::create(&st.db, User::new(email, "hash".into()))
            .await
            .unwrap()
            .id
    }

    async fn cs_group(st: &AppState, owner: Uuid) -> Group {
        create_group(st, owner, "CS", &[], vec!["Mon 10:00".into()], "CS101".into())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_mirrors_chat_and_notifies_members() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let (a, b) = (user(&st, "a@uni.edu").await, user(&st, "b@uni.edu").await);

        let group = create_group(&st, a, "CS", &[b], vec![], String::new())
            .await
            .unwrap();
        let chat = Chat::find_by_id(&st.db, group.id).await.expect("mirrored chat");
        assert_eq!(chat.members, group.members);
        assert_eq!(chat.name, "CS");

        let to_b = Notification::list_for_user(&st.db, b).await;
        assert_eq!(to_b[0].message, "a@uni.edu added you to the group CS");
    }

    #[tokio::test]
    async fn create_rejects_unknown_members_and_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let a = user(&st, "a@uni.edu").await;

        let err = create_group(&st, a, "CS", &[Uuid::new_v4()], vec![], String::new())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Unknown member"));

        cs_group(&st, a).await;
        assert!(create_group(&st, a, "cs", &[], vec![], String::new())
            .await
            .is_err());
        assert_eq!(st.db.groups.all().await.len(), 1);
    }

    #[tokio::test]
    async fn joining_adds_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let (a, b) = (user(&st, "a@uni.edu").await, user(&st, "b@uni.edu").await);
        let group = cs_group(&st, a).await;

        let joined = join_group(&st, b, "cs").await.unwrap();
        assert_eq!(joined.members, vec![a, b]);
        let err = join_group(&st, b, &group.id.to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "User already in the group");

        let chat = Chat::find_by_id(&st.db, group.id).await.unwrap();
        assert_eq!(chat.members, vec![a, b]);
    }

    #[tokio::test]
    async fn leave_transfers_ownership_then_deletes_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let (a, b) = (user(&st, "a@uni.edu").await, user(&st, "b@uni.edu").await);
        let group = cs_group(&st, a).await;
        join_group(&st, b, "CS").await.unwrap();

        let remaining = leave_group(&st, a, "CS").await.unwrap().unwrap();
        assert_eq!(remaining.members, vec![b]);
        assert_eq!(remaining.owner_id, b);

        let err = leave_group(&st, a, "CS").await.unwrap_err();
        assert_eq!(err.to_string(), "User not in this group");

        assert!(leave_group(&st, b, "CS").await.unwrap().is_none());
        assert!(matches!(
            get_group(&st, group.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(Chat::find_by_id(&st.db, group.id).await.is_none());
    }

    #[tokio::test]
    async fn only_members_edit_and_rename_reaches_chat() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let (a, b) = (user(&st, "a@uni.edu").await, user(&st, "b@uni.edu").await);
        let group = cs_group(&st, a).await;

        let changes = || GroupChanges {
            name: Some("Compilers".into()),
            ..GroupChanges::default()
        };
        assert!(edit_group(&st, b, "CS", changes()).await.is_err());

        let edited = edit_group(&st, a, "CS", changes()).await.unwrap();
        assert_eq!(edited.name, "Compilers");
        assert_eq!(edited.specified_class, "CS101");
        assert_eq!(
            Chat::find_by_id(&st.db, group.id).await.unwrap().name,
            "Compilers"
        );
    }

    #[tokio::test]
    async fn filter_by_class_and_time() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let a = user(&st, "a@uni.edu").await;
        cs_group(&st, a).await;

        assert_eq!(filter_groups(&st, "class", "cs101").await.unwrap().len(), 1);
        assert_eq!(filter_groups(&st, "time", "Mon 10:00").await.unwrap().len(), 1);
        assert!(filter_groups(&st, "time", "Tue").await.unwrap().is_empty());
        assert!(filter_groups(&st, "room", "x").await.is_err());
        assert!(filter_groups(&st, "class", "").await.is_err());
    }

    #[tokio::test]
    async fn rename_checks_membership_before_name_clash() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;
        let (a, b) = (user(&st, "a@uni.edu").await, user(&st, "b@uni.edu").await);
        cs_group(&st, a).await;
        create_group(&st, b, "Math", &[], vec![], String::new())
            .await
            .unwrap();

        let to_math = || GroupChanges {
            name: Some("math".into()),
            ..GroupChanges::default()
        };
        let err = edit_group(&st, b, "CS", to_math()).await.unwrap_err();
        assert_eq!(err.to_string(), "User not in this group");
        let err = edit_group(&st, a, "CS", to_math()).await.unwrap_err();
        assert_eq!(err.to_string(), "A group with this name already exists");
        assert_eq!(Group::find_by_name(&st.db, "CS").await.unwrap().name, "CS");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn join_racing_last_leave_is_never_lost() {
        let dir = tempfile::tempdir().unwrap();
        let st = AppState::fake(dir.path()).await;

        for i in 0..40 {
            let a = user(&st, &format!("a{i}@uni.edu")).await;
            let b = user(&st, &format!("b{i}@uni.edu")).await;
            let group = create_group(&st, a, &format!("G{i}"), &[], vec![], String::new())
                .await
                .unwrap();

            let (st_a, st_b) = (st.clone(), st.clone());
            let (id_a, id_b) = (group.id.to_string(), group.id.to_string());
            let leave = tokio::spawn(async move { leave_group(&st_a, a, &id_a).await });
            let join = tokio::spawn(async move { join_group(&st_b, b, &id_b).await });
            leave.await.unwrap().unwrap();

            match join.await.unwrap() {
                Ok(_) => {
                    let g = Group::find_by_id(&st.db, group.id)
                        .await
                        .expect("group with a joined member survives");
                    assert_eq!(g.members, vec![b]);
                    assert_eq!(g.owner_id, b);
                }
                Err(e) => {
                    assert!(matches!(e, AppError::NotFound(_)));
                    assert!(Group::find_by_id(&st.db, group.id).await.is_none());
                }
            }
        }
    }
}
