use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Endpoints of [`BackendApi`], for failure injection and call counting.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Endpoint {
    GetProfile,
    RegisterProfile,
    AddUserTask,
    DeleteUserTask,
    ListBasicUsers,
    RequestGroup,
    MembersTaskInfo,
    ResolvePending,
    GetGroup,
    ListGroups,
    CreateGroup,
    AddGroupTask,
    DeleteGroupTask,
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<UserId, Profile>,
    groups: BTreeMap<GroupId, Group>,
}

/// In-memory backend with the same visibility rules as the real one:
/// private groups are never listed to outsiders and cannot be requested,
/// invitees join only after accepting.
#[derive(Debug, Default)]
pub struct FakeBackendApi {
    store: Mutex<Store>,
    failing: Mutex<HashSet<Endpoint>>,
    profile_delays: DashMap<UserId, Duration>,
    calls: DashMap<Endpoint, usize>,
}

impl FakeBackendApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Counts the call and reports whether it should fail.
    fn hit(&self, endpoint: Endpoint) -> bool {
        *self.calls.entry(endpoint).or_insert(0) += 1;
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&endpoint)
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.store().users.insert(profile.user_id.clone(), profile);
    }

    pub fn insert_group(&self, group: Group) {
        self.store().groups.insert(group.id.clone(), group);
    }

    pub fn profile(&self, user: &UserId) -> Option<Profile> {
        self.store().users.get(user).cloned()
    }

    pub fn group(&self, group: &GroupId) -> Option<Group> {
        self.store().groups.get(group).cloned()
    }

    pub fn set_failing(&self, endpoint: Endpoint, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing {
            set.insert(endpoint);
        } else {
            set.remove(&endpoint);
        }
    }

    /// Holds `GET /users/{id}` for `user` by `delay` before answering.
    pub fn delay_profile(&self, user: &UserId, delay: Duration) {
        self.profile_delays.insert(user.clone(), delay);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.get(&endpoint).map(|c| *c).unwrap_or(0)
    }
}

fn remove_first(tasks: &mut Vec<Task>, key: &TaskKey) -> bool {
    match tasks.iter().position(|t| &t.key() == key) {
        Some(i) => {
            tasks.remove(i);
            true
        }
        None => false,
    }
}

#[async_trait::async_trait]
impl BackendApi for FakeBackendApi {
    async fn get_profile(&self, user: &UserId) -> Option<Profile> {
        if self.hit(Endpoint::GetProfile) {
            return None;
        }
        let delay = self.profile_delays.get(user).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.profile(user)
    }

    async fn register_profile(&self, profile: &NewProfile) -> Option<()> {
        if self.hit(Endpoint::RegisterProfile) {
            return None;
        }
        let mut store = self.store();
        if store.users.contains_key(&profile.user_id) {
            return None;
        }
        store.users.insert(
            profile.user_id.clone(),
            Profile {
                user_id: profile.user_id.clone(),
                username: profile.username.clone(),
                name: profile.name.clone(),
                age: Some(profile.age),
                phone_number: Some(profile.phone_number.clone()),
                tasks: vec![],
                group_invites: vec![],
                user_invites: BTreeMap::new(),
            },
        );
        Some(())
    }

    async fn add_user_task(&self, user: &UserId, task: &Task) -> Option<()> {
        if self.hit(Endpoint::AddUserTask) {
            return None;
        }
        let mut store = self.store();
        let profile = store.users.get_mut(user)?;
        let mut task = task.clone();
        task.user_id = Some(user.clone());
        profile.tasks.push(task);
        Some(())
    }

    async fn delete_user_task(&self, user: &UserId, task: &Task) -> Option<()> {
        if self.hit(Endpoint::DeleteUserTask) {
            return None;
        }
        let mut store = self.store();
        let profile = store.users.get_mut(user)?;
        remove_first(&mut profile.tasks, &task.key()).then_some(())
    }

    async fn list_basic_users(&self) -> Option<Vec<BasicUser>> {
        if self.hit(Endpoint::ListBasicUsers) {
            return None;
        }
        Some(
            self.store()
                .users
                .values()
                .map(|p| BasicUser {
                    user_id: p.user_id.clone(),
                    username: p.username.clone(),
                })
                .collect(),
        )
    }

    async fn request_group(&self, request: &JoinRequestInput) -> Option<()> {
        if self.hit(Endpoint::RequestGroup) {
            return None;
        }
        let mut store = self.store();
        let group = store.groups.get(&request.group_id)?;
        if group.kind != GroupKind::InviteOnly || group.is_member(&request.user_id) {
            return None;
        }
        let owner = group.owner.clone();
        let group_name = group.name.clone();
        let owner_profile = store.users.get_mut(&owner)?;
        let requests = owner_profile
            .user_invites
            .entry(request.group_id.clone())
            .or_default();
        if requests.iter().any(|r| r.user_id == request.user_id) {
            return Some(());
        }
        requests.push(UserJoinRequest {
            user_id: request.user_id.clone(),
            username: request.username.clone(),
            group_id: request.group_id.clone(),
            group_name,
            owner,
            selected: false,
        });
        Some(())
    }

    async fn get_members_task_info(&self, members: &[UserId]) -> Option<Vec<MemberTaskInfo>> {
        if self.hit(Endpoint::MembersTaskInfo) {
            return None;
        }
        let store = self.store();
        Some(
            members
                .iter()
                .filter_map(|id| store.users.get(id))
                .map(|p| MemberTaskInfo {
                    user_id: Some(p.user_id.clone()),
                    username: p.username.clone(),
                    tasks: p.tasks.clone(),
                })
                .collect(),
        )
    }

    async fn resolve_pending(&self, decision: Decision, batch: &ResolveBatch) -> Option<()> {
        if self.hit(Endpoint::ResolvePending) {
            return None;
        }
        let mut store = self.store();
        let Store { users, groups } = &mut *store;

        for invite in &batch.gi {
            if decision == Decision::Accept {
                if let Some(group) = groups.get_mut(&invite.group_id) {
                    group.members.insert(batch.user_id.clone());
                }
            }
            if let Some(profile) = users.get_mut(&batch.user_id) {
                profile.group_invites.retain(|i| i.group_id != invite.group_id);
            }
        }

        for (group_id, requests) in &batch.ui {
            let Some(group) = groups.get_mut(group_id) else {
                continue;
            };
            if group.owner != batch.user_id {
                continue;
            }
            for request in requests {
                if decision == Decision::Accept {
                    group.members.insert(request.user_id.clone());
                }
                if let Some(owner) = users.get_mut(&batch.user_id) {
                    if let Some(pending) = owner.user_invites.get_mut(group_id) {
                        pending.retain(|r| r.user_id != request.user_id);
                        if pending.is_empty() {
                            owner.user_invites.remove(group_id);
                        }
                    }
                }
            }
        }
        Some(())
    }

    async fn get_group(&self, group: &GroupId) -> Option<Group> {
        if self.hit(Endpoint::GetGroup) {
            return None;
        }
        self.group(group)
    }

    async fn list_groups(&self, scope: GroupScope, user: &UserId) -> Option<Vec<GroupSummary>> {
        if self.hit(Endpoint::ListGroups) {
            return None;
        }
        let store = self.store();
        Some(
            store
                .groups
                .values()
                .filter(|g| match scope {
                    GroupScope::User => g.is_member(user),
                    GroupScope::Invite => g.kind == GroupKind::InviteOnly && !g.is_member(user),
                })
                .map(Group::summary)
                .collect(),
        )
    }

    async fn create_group(&self, input: &NewGroup) -> Option<GroupSummary> {
        if self.hit(Endpoint::CreateGroup) {
            return None;
        }
        let mut store = self.store();
        let group = Group {
            id: GroupId(uuid::Uuid::new_v4().simple().to_string()),
            name: input.name.clone(),
            description: input.description.clone(),
            kind: input.kind,
            owner: input.owner.clone(),
            members: [input.owner.clone()].into(),
            tasks: vec![],
        };
        for invitee in input.members.iter().filter(|m| **m != input.owner) {
            if let Some(profile) = store.users.get_mut(invitee) {
                profile.group_invites.push(GroupInvite {
                    group_id: group.id.clone(),
                    group_name: group.name.clone(),
                    selected: false,
                });
            }
        }
        let summary = group.summary();
        store.groups.insert(group.id.clone(), group);
        Some(summary)
    }

    async fn add_group_task(&self, group: &GroupId, task: &Task) -> Option<Task> {
        if self.hit(Endpoint::AddGroupTask) {
            return None;
        }
        let mut store = self.store();
        let group_record = store.groups.get_mut(group)?;
        let mut task = task.clone();
        task.group_id = Some(group.clone());
        task.user_id = None;
        group_record.tasks.push(task.clone());
        Some(task)
    }

    async fn delete_group_task(&self, group: &GroupId, task: &TaskKey) -> Option<()> {
        if self.hit(Endpoint::DeleteGroupTask) {
            return None;
        }
        let mut store = self.store();
        let group_record = store.groups.get_mut(group)?;
        remove_first(&mut group_record.tasks, task).then_some(())
    }
}
