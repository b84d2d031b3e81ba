use crate::application_impl::SessionManager;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RealGroupService {
    session: Arc<SessionManager>,
    backend: Arc<dyn BackendApi>,
}

impl RealGroupService {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn BackendApi>) -> Self {
        Self { session, backend }
    }
}

#[async_trait::async_trait]
impl GroupService for RealGroupService {
    async fn create_group(&self, input: CreateGroupInput) -> Result<GroupSummary, GroupError> {
        validate_group_name(&input.name)?;
        let owner = self.session.user_id().ok_or(GroupError::NotSignedIn)?;

        let mut members: Vec<UserId> = Vec::with_capacity(input.invitees.len());
        for invitee in input.invitees {
            if invitee != owner && !members.contains(&invitee) {
                members.push(invitee);
            }
        }
        let request = NewGroup {
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            kind: input.kind,
            members,
            owner,
        };
        let created = self
            .backend
            .create_group(&request)
            .await
            .ok_or(GroupError::NotCreated)?;
        info!(group = %created.id, kind = %created.kind, "group created");
        Ok(created)
    }

    async fn list_user_groups(&self) -> Vec<GroupSummary> {
        let Some(user) = self.session.user_id() else {
            return vec![];
        };
        self.backend
            .list_groups(GroupScope::User, &user)
            .await
            .unwrap_or_default()
    }

    async fn list_discoverable_groups(&self) -> Vec<DiscoverableGroup> {
        let Some(user) = self.session.user_id() else {
            return vec![];
        };
        let Some(listed) = self.backend.list_groups(GroupScope::Invite, &user).await else {
            return vec![];
        };
        let joined: BTreeSet<GroupId> = self
            .list_user_groups()
            .await
            .into_iter()
            .map(|g| g.id)
            .collect();

        let mut found = Vec::with_capacity(listed.len());
        for summary in listed {
            let id = summary.id.clone();
            match DiscoverableGroup::admit(summary, &user, &joined) {
                Some(group) => found.push(group),
                None => warn!(group = %id, "backend listed a group that cannot be requested"),
            }
        }
        found
    }

    async fn list_inviteable_users(&self) -> Vec<BasicUser> {
        let me = self.session.user_id();
        self.backend
            .list_basic_users()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|u| Some(&u.user_id) != me.as_ref())
            .collect()
    }

    async fn request_to_join(&self, group: &DiscoverableGroup) -> Result<(), GroupError> {
        let profile = self.session.profile().ok_or(GroupError::NotSignedIn)?;
        let summary = group.summary();
        let request = JoinRequestInput {
            group_id: summary.id.clone(),
            user_id: profile.user_id,
            group_name: summary.name.clone(),
            username: profile.username,
            owner: summary.owner.clone(),
        };
        self.backend
            .request_group(&request)
            .await
            .ok_or(GroupError::RequestFailed)?;
        info!(group = %summary.id, "join request sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::SessionConfig;
    use crate::infra_memory::*;
    use std::collections::BTreeMap;

    fn profile(id: &UserId, username: &str) -> Profile {
        Profile {
            user_id: id.clone(),
            username: username.into(),
            name: username.into(),
            age: None,
            phone_number: None,
            tasks: vec![],
            group_invites: vec![],
            user_invites: BTreeMap::new(),
        }
    }

    fn group(id: &str, kind: GroupKind, owner: &UserId) -> Group {
        Group {
            id: GroupId(id.into()),
            name: id.into(),
            description: String::new(),
            kind,
            owner: owner.clone(),
            members: [owner.clone()].into(),
            tasks: vec![],
        }
    }

    async fn setup() -> (Arc<FakeBackendApi>, UserId, UserId, RealGroupService) {
        let identity = Arc::new(FakeIdentityProvider::new().with_account("me@x.io", "secret1"));
        let backend = Arc::new(FakeBackendApi::new());
        let me = get_fake_id("me@x.io");
        let other = UserId("other".into());
        backend.insert_profile(profile(&me, "me"));
        backend.insert_profile(profile(&other, "other"));

        let session = Arc::new(SessionManager::new(
            identity,
            backend.clone(),
            SessionConfig::default(),
        ));
        session
            .sign_in(&SignInForm {
                email: "me@x.io".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        let groups = RealGroupService::new(session, backend.clone());
        (backend, me, other, groups)
    }

    #[tokio::test]
    async fn private_groups_are_never_discoverable() {
        let (backend, _me, other, groups) = setup().await;
        backend.insert_group(group("secret", GroupKind::Private, &other));
        backend.insert_group(group("open", GroupKind::InviteOnly, &other));

        let found = groups.list_discoverable_groups().await;
        let ids: Vec<_> = found.iter().map(|g| g.summary().id.0.as_str()).collect();
        assert_eq!(ids, vec!["open"]);
    }

    #[tokio::test]
    async fn own_groups_are_not_discoverable() {
        let (backend, me, _other, groups) = setup().await;
        backend.insert_group(group("mine", GroupKind::InviteOnly, &me));

        assert!(groups.list_discoverable_groups().await.is_empty());
        assert_eq!(groups.list_user_groups().await.len(), 1);
    }

    #[tokio::test]
    async fn creating_never_invites_the_owner() {
        let (backend, me, other, groups) = setup().await;
        let created = groups
            .create_group(CreateGroupInput {
                name: "Climbing".into(),
                description: "weekends".into(),
                kind: GroupKind::InviteOnly,
                invitees: vec![me.clone(), other.clone()],
            })
            .await
            .unwrap();

        assert_eq!(created.owner, me);
        assert_eq!(backend.profile(&other).unwrap().group_invites.len(), 1);
        assert!(backend.profile(&me).unwrap().group_invites.is_empty());
    }

    #[tokio::test]
    async fn blank_group_name_is_rejected() {
        let (backend, _me, _other, groups) = setup().await;
        let err = groups
            .create_group(CreateGroupInput {
                name: "  ".into(),
                description: String::new(),
                kind: GroupKind::Private,
                invitees: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Invalid(ValidationError::GroupNameMissing)));
        assert_eq!(backend.calls(Endpoint::CreateGroup), 0);
    }

    #[tokio::test]
    async fn join_request_reaches_the_owner() {
        let (backend, me, other, groups) = setup().await;
        backend.insert_group(group("open", GroupKind::InviteOnly, &other));

        let found = groups.list_discoverable_groups().await;
        groups.request_to_join(&found[0]).await.unwrap();

        let owner = backend.profile(&other).unwrap();
        let requests = &owner.user_invites[&GroupId("open".into())];
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_id, me);
        assert_eq!(requests[0].username, "me");
    }

    #[tokio::test]
    async fn inviteable_users_exclude_self() {
        let (_backend, _me, other, groups) = setup().await;
        let users = groups.list_inviteable_users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, other);
    }

    #[tokio::test]
    async fn listing_failures_degrade_to_empty() {
        let (backend, _me, other, groups) = setup().await;
        backend.insert_group(group("open", GroupKind::InviteOnly, &other));
        backend.set_failing(Endpoint::ListGroups, true);
        assert!(groups.list_discoverable_groups().await.is_empty());
        assert!(groups.list_user_groups().await.is_empty());
    }
}
