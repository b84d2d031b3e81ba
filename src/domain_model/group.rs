use crate::domain_model::{Task, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Private groups are invisible to non-members; invite-only groups can be
/// found but not joined without the owner.
///
/// Older records carry other types (e.g. `"public"`). They decode as `Other`,
/// are listed to their members and are never discoverable.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "invite", alias = "invite-only")]
    InviteOnly,
    #[serde(rename = "other", other)]
    Other,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Private => f.write_str("private"),
            GroupKind::InviteOnly => f.write_str("invite"),
            GroupKind::Other => f.write_str("other"),
        }
    }
}

impl std::str::FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(GroupKind::Private),
            "invite" | "invite-only" => Ok(GroupKind::InviteOnly),
            other => Err(format!("unknown group type: {other}")),
        }
    }
}

/// Listing entry from `GET /groups/getGroups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub owner: UserId,
}

/// Full group record from `GET /groups/getGroup/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id", alias = "id")]
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub owner: UserId,
    #[serde(default)]
    pub members: BTreeSet<UserId>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Group {
    pub fn is_member(&self, user: &UserId) -> bool {
        &self.owner == user || self.members.contains(user)
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            owner: self.owner.clone(),
        }
    }
}

/// A group the viewer may ask to join.
///
/// The only constructor refuses private groups and groups the viewer already
/// belongs to, so a join request for a private group cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverableGroup(GroupSummary);

impl DiscoverableGroup {
    pub fn admit(
        summary: GroupSummary,
        viewer: &UserId,
        joined: &BTreeSet<GroupId>,
    ) -> Option<Self> {
        if summary.kind != GroupKind::InviteOnly {
            return None;
        }
        if &summary.owner == viewer || joined.contains(&summary.id) {
            return None;
        }
        Some(DiscoverableGroup(summary))
    }

    pub fn summary(&self) -> &GroupSummary {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GroupAction {
    GoToTasks,
    RequestToJoin,
}

/// Which list a group was picked from. The two are never interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    Member(GroupSummary),
    Discoverable(DiscoverableGroup),
}

impl GroupSelection {
    pub fn actions(&self) -> &'static [GroupAction] {
        match self {
            GroupSelection::Member(_) => &[GroupAction::GoToTasks],
            GroupSelection::Discoverable(_) => &[GroupAction::RequestToJoin],
        }
    }

    pub fn summary(&self) -> &GroupSummary {
        match self {
            GroupSelection::Member(summary) => summary,
            GroupSelection::Discoverable(group) => group.summary(),
        }
    }
}

/// Case-insensitive name filter used by the group search box.
pub fn search_groups<'a>(
    groups: &'a [DiscoverableGroup],
    term: &str,
) -> Vec<&'a DiscoverableGroup> {
    let term = term.trim().to_lowercase();
    groups
        .iter()
        .filter(|g| term.is_empty() || g.summary().name.to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, kind: GroupKind, owner: &str) -> GroupSummary {
        GroupSummary {
            id: GroupId(id.into()),
            name: format!("Group {id}"),
            description: String::new(),
            kind,
            owner: UserId(owner.into()),
        }
    }

    fn admit(id: &str, kind: GroupKind, owner: &str, joined: &BTreeSet<GroupId>) -> bool {
        let viewer = UserId("me".into());
        DiscoverableGroup::admit(summary(id, kind, owner), &viewer, joined).is_some()
    }

    #[test]
    fn private_groups_are_never_discoverable() {
        let joined = BTreeSet::new();
        assert!(!admit("g1", GroupKind::Private, "o", &joined));
        assert!(admit("g2", GroupKind::InviteOnly, "o", &joined));
    }

    #[test]
    fn own_and_joined_groups_are_not_discoverable() {
        let joined = BTreeSet::from([GroupId("g3".into())]);
        assert!(!admit("g2", GroupKind::InviteOnly, "me", &joined));
        assert!(!admit("g3", GroupKind::InviteOnly, "o", &joined));
    }

    #[test]
    fn selection_source_decides_the_action() {
        let viewer = UserId("me".into());
        let member = GroupSelection::Member(summary("g1", GroupKind::Private, "me"));
        assert_eq!(member.actions(), &[GroupAction::GoToTasks]);

        let found = summary("g2", GroupKind::InviteOnly, "o");
        let found = DiscoverableGroup::admit(found, &viewer, &BTreeSet::new()).unwrap();
        let found = GroupSelection::Discoverable(found);
        assert_eq!(found.actions(), &[GroupAction::RequestToJoin]);
        assert!(!found.actions().contains(&GroupAction::GoToTasks));
    }

    #[test]
    fn search_is_case_insensitive() {
        let viewer = UserId("me".into());
        let groups: Vec<_> = ["Chess Club", "Climbing", "Book club"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut s = summary(&format!("g{i}"), GroupKind::InviteOnly, "o");
                s.name = name.to_string();
                DiscoverableGroup::admit(s, &viewer, &BTreeSet::new()).unwrap()
            })
            .collect();
        assert_eq!(search_groups(&groups, "CLUB").len(), 2);
        assert_eq!(search_groups(&groups, "").len(), 3);
        assert!(search_groups(&groups, "swim").is_empty());
    }

    #[test]
    fn unknown_kinds_are_listed_but_never_discoverable() {
        let json = r#"[
            {"_id":"g1","name":"Band","type":"invite","owner":"o"},
            {"_id":"g2","name":"Legacy","type":"public","owner":"o"}
        ]"#;
        let listed: Vec<GroupSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].kind, GroupKind::Other);

        let viewer = UserId("me".into());
        let found: Vec<_> = listed
            .into_iter()
            .filter_map(|g| DiscoverableGroup::admit(g, &viewer, &BTreeSet::new()))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].summary().id, GroupId("g1".into()));
    }

    #[test]
    fn decodes_mongo_ids_and_kinds() {
        let json = r#"{
            "_id": "abc",
            "name": "Team",
            "type": "invite",
            "owner": "u1",
            "members": ["u1", "u2"]
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, GroupId("abc".into()));
        assert_eq!(group.kind, GroupKind::InviteOnly);
        assert!(group.is_member(&UserId("u2".into())));
        assert!(group.tasks.is_empty());
    }
}
