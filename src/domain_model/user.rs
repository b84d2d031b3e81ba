use crate::domain_model::{GroupId, GroupInvite, Task, UserJoinRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque id issued by the identity provider. The backend keys profiles by it.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(UserId(s.to_string()))
    }
}

/// The application record for a principal, as served by `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub group_invites: Vec<GroupInvite>,
    #[serde(default)]
    pub user_invites: BTreeMap<GroupId, Vec<UserJoinRequest>>,
}

/// Entry of the inviteable-users listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicUser {
    pub user_id: UserId,
    pub username: String,
}

/// Per-member task list returned by `POST /users/getUsersTaskInfo`.
///
/// Only the date and time of these tasks are ever surfaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTaskInfo {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}
