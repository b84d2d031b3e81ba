use crate::application_impl::SessionManager;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::BackendApi;
use std::sync::Arc;
use tracing::debug;

pub struct RealTaskService {
    session: Arc<SessionManager>,
    backend: Arc<dyn BackendApi>,
}

impl RealTaskService {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn BackendApi>) -> Self {
        Self { session, backend }
    }
}

#[async_trait::async_trait]
impl TaskService for RealTaskService {
    async fn add_task(
        &self,
        draft: TaskDraft,
        selected_day: CalendarDay,
    ) -> Result<Task, TaskError> {
        let mut task = validate_task(&draft, selected_day)?;
        let user = self.session.user_id().ok_or(TaskError::NotSignedIn)?;
        task.user_id = Some(user.clone());

        let key = self.session.with_tasks(|cache| cache.add_pending(task.clone()));
        if self.backend.add_user_task(&user, &task).await.is_none() {
            self.session.with_tasks(|cache| cache.discard_pending(&key));
            return Err(TaskError::NotSaved);
        }
        if !self.session.with_tasks(|cache| cache.confirm(&key)) {
            debug!(title = %task.title, "task already confirmed by a refetch");
        }
        self.session.refresh_profile().await;
        Ok(task)
    }

    async fn complete_task(&self, task: &Task) -> Result<(), TaskError> {
        let user = self.session.user_id().ok_or(TaskError::NotSignedIn)?;
        self.backend
            .delete_user_task(&user, task)
            .await
            .ok_or(TaskError::NotRemoved)?;
        self.session.with_tasks(|cache| cache.remove(&task.key()));
        self.session.refresh_profile().await;
        Ok(())
    }

    fn tasks_for_day(&self, day: CalendarDay) -> DayProjection {
        self.session.with_tasks(|cache| DayProjection {
            day_tasks: cache.tasks_on(day),
            highlighted: cache.highlighted(),
        })
    }

    fn today(&self) -> Vec<Task> {
        let tasks = self.session.with_tasks(|cache| cache.tasks());
        project_today(&tasks, CalendarDay::today())
    }
}
