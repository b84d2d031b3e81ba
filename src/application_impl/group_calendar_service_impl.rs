use crate::application_impl::SessionManager;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RealGroupCalendarService {
    session: Arc<SessionManager>,
    backend: Arc<dyn BackendApi>,
}

impl RealGroupCalendarService {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn BackendApi>) -> Self {
        Self { session, backend }
    }
}

#[async_trait::async_trait]
impl GroupCalendarService for RealGroupCalendarService {
    async fn load(&self, group: &GroupId) -> Option<GroupCalendar> {
        let Some(record) = self.backend.get_group(group).await else {
            warn!(%group, "group could not be loaded");
            return None;
        };

        let members: Vec<UserId> = record.members.iter().cloned().collect();
        let member_tasks = if members.is_empty() {
            vec![]
        } else {
            match self.backend.get_members_task_info(&members).await {
                Some(info) => info,
                None => {
                    debug!(%group, "member tasks unavailable");
                    vec![]
                }
            }
        };

        Some(GroupCalendar {
            group: record,
            member_tasks,
        })
    }

    async fn load_active(&self) -> Result<Option<GroupCalendar>, GroupCalendarError> {
        let group = self
            .session
            .active_group()
            .ok_or(GroupCalendarError::NoActiveGroup)?;
        Ok(self.load(&group).await)
    }

    async fn add_group_task(
        &self,
        calendar: &mut GroupCalendar,
        draft: TaskDraft,
        selected_day: CalendarDay,
    ) -> Result<Task, GroupCalendarError> {
        let mut task = validate_task(&draft, selected_day)?;
        task.group_id = Some(calendar.group.id.clone());

        let saved = self
            .backend
            .add_group_task(&calendar.group.id, &task)
            .await
            .ok_or(GroupCalendarError::NotSaved)?;
        calendar.group.tasks.push(saved.clone());
        Ok(saved)
    }

    async fn complete_group_task(
        &self,
        calendar: &mut GroupCalendar,
        task: &Task,
    ) -> Result<(), GroupCalendarError> {
        let key = task.key();
        self.backend
            .delete_group_task(&calendar.group.id, &key)
            .await
            .ok_or(GroupCalendarError::NotRemoved)?;
        if let Some(i) = calendar.group.tasks.iter().position(|t| t.key() == key) {
            calendar.group.tasks.remove(i);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::SessionConfig;
    use crate::infra_memory::*;
    use std::collections::BTreeMap;

    fn task(title: &str, date: &str, time: &str) -> Task {
        Task {
            title: title.into(),
            time: time.parse().unwrap(),
            date: date.parse().unwrap(),
            content: None,
            user_id: None,
            group_id: None,
        }
    }

    fn profile(id: &UserId, username: &str, tasks: Vec<Task>) -> Profile {
        Profile {
            user_id: id.clone(),
            username: username.into(),
            name: username.into(),
            age: None,
            phone_number: None,
            tasks,
            group_invites: vec![],
            user_invites: BTreeMap::new(),
        }
    }

    async fn setup() -> (
        Arc<FakeBackendApi>,
        Arc<SessionManager>,
        RealGroupCalendarService,
        UserId,
    ) {
        let identity = Arc::new(FakeIdentityProvider::new().with_account("me@x.io", "secret1"));
        let backend = Arc::new(FakeBackendApi::new());
        let me = get_fake_id("me@x.io");
        let bo = UserId("bo".into());
        backend.insert_profile(profile(&me, "me", vec![task("Gym", "2024-06-01", "07:00")]));
        backend.insert_profile(profile(&bo, "bo", vec![task("Call", "2024-06-01", "09:30")]));
        backend.insert_group(Group {
            id: GroupId("g1".into()),
            name: "Band".into(),
            description: String::new(),
            kind: GroupKind::Private,
            owner: me.clone(),
            members: [me.clone(), bo].into(),
            tasks: vec![task("Rehearsal", "2024-06-02", "19:00")],
        });

        let session = Arc::new(SessionManager::new(
            identity,
            backend.clone(),
            SessionConfig::default(),
        ));
        session
            .sign_in(&SignInForm {
                email: "me@x.io".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        let calendars = RealGroupCalendarService::new(session.clone(), backend.clone());
        (backend, session, calendars, me)
    }

    #[tokio::test]
    async fn projects_member_timings_without_the_viewer() {
        let (_backend, _session, calendars, me) = setup().await;
        let calendar = calendars.load(&GroupId("g1".into())).await.unwrap();
        let day: CalendarDay = "2024-06-01".parse().unwrap();

        let projection = calendar.project(&me, day);
        assert!(projection.group_tasks.is_empty());
        assert_eq!(projection.member_timings.len(), 1);
        assert_eq!(projection.member_timings[0].username, "bo");
        assert_eq!(projection.marker(day), Some(DayMarker::MemberOnly));
        assert_eq!(
            projection.marker("2024-06-02".parse().unwrap()),
            Some(DayMarker::GroupTask)
        );
    }

    #[tokio::test]
    async fn missing_group_skips_the_member_fetch() {
        let (backend, _session, calendars, _me) = setup().await;
        backend.set_failing(Endpoint::GetGroup, true);
        assert!(calendars.load(&GroupId("g1".into())).await.is_none());
        assert_eq!(backend.calls(Endpoint::MembersTaskInfo), 0);
    }

    #[tokio::test]
    async fn member_fetch_failure_keeps_group_tasks() {
        let (backend, _session, calendars, _me) = setup().await;
        backend.set_failing(Endpoint::MembersTaskInfo, true);
        let calendar = calendars.load(&GroupId("g1".into())).await.unwrap();
        assert!(calendar.member_tasks.is_empty());
        assert_eq!(calendar.group.tasks.len(), 1);
    }

    #[tokio::test]
    async fn active_group_comes_from_the_session() {
        let (_backend, session, calendars, _me) = setup().await;
        assert!(matches!(
            calendars.load_active().await,
            Err(GroupCalendarError::NoActiveGroup)
        ));

        let summary = calendars.load(&GroupId("g1".into())).await.unwrap().group.summary();
        assert!(session.open_group(&GroupSelection::Member(summary)));
        let calendar = calendars.load_active().await.unwrap().unwrap();
        assert_eq!(calendar.group.id, GroupId("g1".into()));
    }

    #[tokio::test]
    async fn add_then_complete_group_task() {
        let (backend, _session, calendars, _me) = setup().await;
        let mut calendar = calendars.load(&GroupId("g1".into())).await.unwrap();
        let day: CalendarDay = "2024-06-03".parse().unwrap();
        let draft = TaskDraft {
            title: "Gig".into(),
            time: "20:00".into(),
            date: None,
            content: String::new(),
        };

        let saved = calendars.add_group_task(&mut calendar, draft, day).await.unwrap();
        assert_eq!(saved.group_id, Some(GroupId("g1".into())));
        assert_eq!(calendar.group.tasks.len(), 2);

        calendars.complete_group_task(&mut calendar, &saved).await.unwrap();
        assert_eq!(calendar.group.tasks.len(), 1);
        assert_eq!(backend.group(&GroupId("g1".into())).unwrap().tasks.len(), 1);
    }
}
