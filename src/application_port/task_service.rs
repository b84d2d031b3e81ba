use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("task was not saved")]
    NotSaved,
    #[error("task was not removed")]
    NotRemoved,
}

/// Personal tasks of the signed-in user.
#[async_trait::async_trait]
pub trait TaskService: Send + Sync {
    /// Adds a task on `draft.date`, or on `selected_day` when the draft has none.
    async fn add_task(
        &self,
        draft: TaskDraft,
        selected_day: CalendarDay,
    ) -> Result<Task, TaskError>;
    /// Completing a task deletes it.
    async fn complete_task(&self, task: &Task) -> Result<(), TaskError>;
    fn tasks_for_day(&self, day: CalendarDay) -> DayProjection;
    fn today(&self) -> Vec<Task>;
}
