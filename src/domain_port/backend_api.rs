use crate::domain_model::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Which `getGroups` listing to ask for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GroupScope {
    /// Invite-only groups the user is not in.
    Invite,
    /// Groups the user belongs to.
    User,
}

impl GroupScope {
    pub fn as_query(&self) -> &'static str {
        match self {
            GroupScope::Invite => "invite",
            GroupScope::User => "user",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub user_id: UserId,
    pub username: String,
    pub name: String,
    pub age: u32,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub members: Vec<UserId>,
    pub owner: UserId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestInput {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub group_name: String,
    pub username: String,
    pub owner: UserId,
}

/// Body of `PUT /groups/addUser`: the invites and join requests to resolve.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveBatch {
    pub gi: Vec<GroupInvite>,
    pub ui: BTreeMap<GroupId, Vec<UserJoinRequest>>,
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// The REST backend.
///
/// Every call yields `None` when the request fails for any reason
/// (transport, non-2xx status, undecodable body). Callers cannot tell those
/// apart and treat `None` as "no data".
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    /// GET /users/{id}
    async fn get_profile(&self, user: &UserId) -> Option<Profile>;
    /// POST /users
    async fn register_profile(&self, profile: &NewProfile) -> Option<()>;
    /// PUT /users/{id}
    async fn add_user_task(&self, user: &UserId, task: &Task) -> Option<()>;
    /// DELETE /users/deletetask/{id}
    async fn delete_user_task(&self, user: &UserId, task: &Task) -> Option<()>;
    /// GET /users?type=basic
    async fn list_basic_users(&self) -> Option<Vec<BasicUser>>;
    /// POST /users/requestGroup
    async fn request_group(&self, request: &JoinRequestInput) -> Option<()>;
    /// POST /users/getUsersTaskInfo
    async fn get_members_task_info(&self, members: &[UserId]) -> Option<Vec<MemberTaskInfo>>;
    /// PUT /groups/addUser?type=accept|reject
    async fn resolve_pending(&self, decision: Decision, batch: &ResolveBatch) -> Option<()>;
    /// GET /groups/getGroup/{id}
    async fn get_group(&self, group: &GroupId) -> Option<Group>;
    /// GET /groups/getGroups?type=invite|user&userId=
    async fn list_groups(&self, scope: GroupScope, user: &UserId) -> Option<Vec<GroupSummary>>;
    /// POST /groups/createGroup
    async fn create_group(&self, group: &NewGroup) -> Option<GroupSummary>;
    /// PUT /groups/addTask/{id}
    async fn add_group_task(&self, group: &GroupId, task: &Task) -> Option<Task>;
    /// POST /groups/deleteTask/{id}
    async fn delete_group_task(&self, group: &GroupId, task: &TaskKey) -> Option<()>;
}
