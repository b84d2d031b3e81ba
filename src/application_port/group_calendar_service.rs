use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum GroupCalendarError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("no group selected")]
    NoActiveGroup,
    #[error("task was not saved")]
    NotSaved,
    #[error("task was not removed")]
    NotRemoved,
}

/// A group's record plus its members' task lists, fetched together.
#[derive(Debug, Clone)]
pub struct GroupCalendar {
    pub group: Group,
    /// Empty when the member fetch failed or the group has no members.
    pub member_tasks: Vec<MemberTaskInfo>,
}

impl GroupCalendar {
    pub fn project(&self, viewer: &UserId, day: CalendarDay) -> GroupDayProjection {
        project_group_day(&self.group.tasks, &self.member_tasks, viewer, day)
    }
}

#[async_trait::async_trait]
pub trait GroupCalendarService: Send + Sync {
    /// `None` when the group record itself could not be loaded.
    async fn load(&self, group: &GroupId) -> Option<GroupCalendar>;
    /// Loads the group the session currently points at.
    async fn load_active(&self) -> Result<Option<GroupCalendar>, GroupCalendarError>;
    async fn add_group_task(
        &self,
        calendar: &mut GroupCalendar,
        draft: TaskDraft,
        selected_day: CalendarDay,
    ) -> Result<Task, GroupCalendarError>;
    async fn complete_group_task(
        &self,
        calendar: &mut GroupCalendar,
        task: &Task,
    ) -> Result<(), GroupCalendarError>;
}
