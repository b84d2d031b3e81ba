//! Derivations behind the calendar views.
//!
//! Everything here is a pure function of its inputs and recomputes from the
//! full task list; callers re-run it whenever the tasks or the selected day
//! change.

use crate::domain_model::{CalendarDay, MemberTaskInfo, Task, TaskTime, UserId};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayProjection {
    /// Tasks on the selected day, in source order.
    pub day_tasks: Vec<Task>,
    /// Every day holding at least one task.
    pub highlighted: BTreeSet<CalendarDay>,
}

pub fn highlighted_days<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeSet<CalendarDay> {
    tasks.into_iter().map(|t| t.date).collect()
}

pub fn tasks_on(tasks: &[Task], day: CalendarDay) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_on(day)).cloned().collect()
}

pub fn project_day(tasks: &[Task], day: CalendarDay) -> DayProjection {
    DayProjection {
        day_tasks: tasks_on(tasks, day),
        highlighted: highlighted_days(tasks),
    }
}

/// The tasks of the current local day.
pub fn project_today(tasks: &[Task], today: CalendarDay) -> Vec<Task> {
    tasks_on(tasks, today)
}

/// Busy/free view of one member for one day: times only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTimings {
    pub username: String,
    pub times: Vec<TaskTime>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DayMarker {
    /// Filled: the group itself has a task that day.
    GroupTask,
    /// Bordered: only members' personal tasks fall on that day.
    MemberOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDayProjection {
    pub group_tasks: Vec<Task>,
    pub member_timings: Vec<MemberTimings>,
    pub group_highlight: BTreeSet<CalendarDay>,
    pub member_only_highlight: BTreeSet<CalendarDay>,
}

impl GroupDayProjection {
    pub fn marker(&self, day: CalendarDay) -> Option<DayMarker> {
        if self.group_highlight.contains(&day) {
            Some(DayMarker::GroupTask)
        } else if self.member_only_highlight.contains(&day) {
            Some(DayMarker::MemberOnly)
        } else {
            None
        }
    }
}

/// Group tasks are shown in full. Other members contribute only the times
/// they are busy on `day`; the viewer's own entry is left out of the timings
/// but still counts towards the member highlight.
pub fn project_group_day(
    group_tasks: &[Task],
    members: &[MemberTaskInfo],
    viewer: &UserId,
    day: CalendarDay,
) -> GroupDayProjection {
    let group_highlight = highlighted_days(group_tasks);

    let member_only_highlight = members
        .iter()
        .flat_map(|m| m.tasks.iter())
        .map(|t| t.date)
        .filter(|d| !group_highlight.contains(d))
        .collect();

    let member_timings = members
        .iter()
        .filter(|m| m.user_id.as_ref() != Some(viewer))
        .filter_map(|m| {
            let times: BTreeSet<TaskTime> = m
                .tasks
                .iter()
                .filter(|t| t.is_on(day))
                .map(|t| t.time.clone())
                .collect();
            (!times.is_empty()).then(|| MemberTimings {
                username: m.username.clone(),
                times: times.into_iter().collect(),
            })
        })
        .collect();

    GroupDayProjection {
        group_tasks: tasks_on(group_tasks, day),
        member_timings,
        group_highlight,
        member_only_highlight,
    }
}
