use crate::domain_model::{GroupId, Profile, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An owner asked this user to join `group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInvite {
    pub group_id: GroupId,
    pub group_name: String,
    #[serde(default)]
    pub selected: bool,
}

/// Someone asked to join a group this user owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinRequest {
    pub user_id: UserId,
    pub username: String,
    pub group_id: GroupId,
    pub group_name: String,
    pub owner: UserId,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn as_query(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// The notification view's working copy of invites and join requests.
/// Selection flags live here only; nothing is persisted until resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingItems {
    pub invites: Vec<GroupInvite>,
    pub requests: BTreeMap<GroupId, Vec<UserJoinRequest>>,
}

impl PendingItems {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            invites: profile.group_invites.clone(),
            requests: profile.user_invites.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.invites.is_empty() && self.requests.values().all(Vec::is_empty)
    }

    pub fn toggle_invite(&mut self, group: &GroupId) {
        for invite in self.invites.iter_mut().filter(|i| &i.group_id == group) {
            invite.selected = !invite.selected;
        }
    }

    pub fn toggle_request(&mut self, group: &GroupId, user: &UserId) {
        if let Some(requests) = self.requests.get_mut(group) {
            for request in requests.iter_mut().filter(|r| &r.user_id == user) {
                request.selected = !request.selected;
            }
        }
    }

    pub fn select_all(&mut self) {
        self.invites.iter_mut().for_each(|i| i.selected = true);
        self.requests
            .values_mut()
            .flatten()
            .for_each(|r| r.selected = true);
    }

    pub fn selected_invites(&self) -> Vec<GroupInvite> {
        self.invites.iter().filter(|i| i.selected).cloned().collect()
    }

    /// Selected requests, keyed by group like the profile record.
    pub fn selected_requests(&self) -> BTreeMap<GroupId, Vec<UserJoinRequest>> {
        self.requests
            .iter()
            .filter_map(|(group, requests)| {
                let picked: Vec<_> = requests.iter().filter(|r| r.selected).cloned().collect();
                (!picked.is_empty()).then(|| (group.clone(), picked))
            })
            .collect()
    }

    pub fn has_selection(&self) -> bool {
        self.invites.iter().any(|i| i.selected)
            || self.requests.values().flatten().any(|r| r.selected)
    }

    /// Drops every selected entry; groups left without requests disappear.
    pub fn remove_selected(&mut self) {
        self.invites.retain(|i| !i.selected);
        for requests in self.requests.values_mut() {
            requests.retain(|r| !r.selected);
        }
        self.requests.retain(|_, requests| !requests.is_empty());
    }
}
