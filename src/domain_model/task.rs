use crate::domain_model::{CalendarDay, GroupId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time of day as entered in the task form, `HH:MM`.
///
/// The zero-padded form orders lexicographically the same way it orders
/// chronologically, so the derived `Ord` is meaningful.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskTime(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a time of day (HH:MM): {0:?}")]
pub struct ParseTimeError(pub String);

impl TaskTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TaskTime {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(err());
        }
        let h: u8 = h.parse().map_err(|_| err())?;
        let m: u8 = m.parse().map_err(|_| err())?;
        if h > 23 || m > 59 {
            return Err(err());
        }
        Ok(TaskTime(format!("{h:02}:{m:02}")))
    }
}

impl<'de> Deserialize<'de> for TaskTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TaskTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOwner {
    User(UserId),
    Group(GroupId),
}

/// A dated to-do. There is no completed state; completing a task deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub time: TaskTime,
    pub date: CalendarDay,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl Task {
    pub fn owner(&self) -> Option<TaskOwner> {
        match (&self.group_id, &self.user_id) {
            (Some(group), _) => Some(TaskOwner::Group(group.clone())),
            (None, Some(user)) => Some(TaskOwner::User(user.clone())),
            (None, None) => None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey {
            title: self.title.clone(),
            date: self.date,
            time: self.time.clone(),
        }
    }

    pub fn is_on(&self, day: CalendarDay) -> bool {
        self.date == day
    }
}

/// What identifies a task to the backend: there are no task ids, so title,
/// day and time together are the key. Same-day tasks at different times are
/// distinct.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub title: String,
    pub date: CalendarDay,
    pub time: TaskTime,
}

/// Unvalidated task form input.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub time: String,
    pub date: Option<CalendarDay>,
    pub content: String,
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_normalised_and_bounded() {
        assert_eq!("07:05".parse::<TaskTime>().unwrap().as_str(), "07:05");
        assert!("7:05".parse::<TaskTime>().is_err());
        assert!("24:00".parse::<TaskTime>().is_err());
        assert!("12:60".parse::<TaskTime>().is_err());
        assert!("noon".parse::<TaskTime>().is_err());
    }

    #[test]
    fn times_order_chronologically() {
        let early: TaskTime = "07:00".parse().unwrap();
        let late: TaskTime = "19:30".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn decodes_backend_task_shape() {
        let json = r#"{
            "title": "Gym",
            "time": "07:00",
            "date": "2024-06-01",
            "content": "",
            "userId": "u1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.content, None);
        assert_eq!(task.owner(), Some(TaskOwner::User(UserId("u1".into()))));
    }

    #[test]
    fn group_owner_wins_over_user() {
        let json = r#"{
            "title": "Sync",
            "time": "10:00",
            "date": "2024-06-01",
            "groupId": "g1",
            "userId": "u1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.owner(), Some(TaskOwner::Group(GroupId("g1".into()))));
    }
}
