use groupcal::application_impl::*;
use groupcal::application_port::*;
use groupcal::client::Client;
use groupcal::domain_model::*;
use groupcal::infra_memory::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

struct World {
    backend: Arc<FakeBackendApi>,
}

impl World {
    fn new(users: &[(&str, &str)]) -> Self {
        let backend = Arc::new(FakeBackendApi::new());
        for (email, username) in users {
            backend.insert_profile(Profile {
                user_id: get_fake_id(email),
                username: username.to_string(),
                name: username.to_string(),
                age: None,
                phone_number: None,
                tasks: vec![],
                group_invites: vec![],
                user_invites: BTreeMap::new(),
            });
        }
        Self { backend }
    }

    async fn sign_in(&self, email: &str) -> Client {
        let identity = Arc::new(FakeIdentityProvider::new().with_account(email, "secret1"));
        let config = SessionConfig {
            profile_retries: 0,
            retry_backoff: Duration::from_millis(1),
        };
        let client = Client::from_parts(identity, self.backend.clone(), config);
        client
            .session
            .sign_in(&SignInForm {
                email: email.into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        client
    }
}

fn draft(title: &str, time: &str, date: &str) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        time: time.into(),
        date: Some(date.parse().unwrap()),
        content: String::new(),
    }
}

#[tokio::test]
async fn invite_accept_makes_the_group_openable() {
    let world = World::new(&[("ann@x.io", "ann"), ("ben@x.io", "ben")]);
    let ann = world.sign_in("ann@x.io").await;
    let created = ann
        .groups
        .create_group(CreateGroupInput {
            name: "Choir".into(),
            description: "Tuesdays".into(),
            kind: GroupKind::Private,
            invitees: vec![get_fake_id("ben@x.io")],
        })
        .await
        .unwrap();

    let ben = world.sign_in("ben@x.io").await;
    assert!(ben.groups.list_user_groups().await.is_empty());
    assert!(ben.groups.list_discoverable_groups().await.is_empty());

    let mut pending = ben.invites.pending();
    assert_eq!(pending.invites.len(), 1);
    pending.select_all();
    let outcome = ben.invites.resolve(Decision::Accept, &mut pending).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Resolved { invites: 1, requests: 0 });

    let mine = ben.groups.list_user_groups().await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, created.id);
    assert!(ben.session.open_group(&GroupSelection::Member(mine[0].clone())));
    let calendar = ben.group_calendar.load_active().await.unwrap().unwrap();
    assert_eq!(calendar.group.name, "Choir");

    ann.shutdown().await;
    ben.shutdown().await;
}

#[tokio::test]
async fn join_request_round_trip() {
    let world = World::new(&[("ann@x.io", "ann"), ("ben@x.io", "ben")]);
    let ann = world.sign_in("ann@x.io").await;
    ann.groups
        .create_group(CreateGroupInput {
            name: "Runners".into(),
            description: String::new(),
            kind: GroupKind::InviteOnly,
            invitees: vec![],
        })
        .await
        .unwrap();

    let ben = world.sign_in("ben@x.io").await;
    let found = ben.groups.list_discoverable_groups().await;
    let hits = search_groups(&found, "run");
    assert_eq!(hits.len(), 1);
    let selection = GroupSelection::Discoverable(hits[0].clone());
    assert_eq!(selection.actions(), &[GroupAction::RequestToJoin]);
    assert!(!ben.session.open_group(&selection));
    ben.groups.request_to_join(hits[0]).await.unwrap();

    ann.session.refresh_profile().await.unwrap();
    let mut pending = ann.invites.pending();
    assert_eq!(pending.requests.values().flatten().count(), 1);
    pending.select_all();
    ann.invites.resolve(Decision::Accept, &mut pending).await.unwrap();
    assert!(ann.invites.pending().is_empty());

    assert_eq!(ben.groups.list_user_groups().await.len(), 1);
    assert!(ben.groups.list_discoverable_groups().await.is_empty());

    ann.shutdown().await;
    ben.shutdown().await;
}

#[tokio::test]
async fn group_calendar_shows_times_of_other_members_only() {
    let world = World::new(&[("ann@x.io", "ann"), ("ben@x.io", "ben")]);
    let ann = world.sign_in("ann@x.io").await;
    let ben = world.sign_in("ben@x.io").await;

    let day: CalendarDay = "2024-06-01".parse().unwrap();
    ann.tasks
        .add_task(draft("Gym", "07:00", "2024-06-01"), day)
        .await
        .unwrap();
    ben.tasks
        .add_task(draft("Call", "09:30", "2024-06-01"), day)
        .await
        .unwrap();

    let group = ann
        .groups
        .create_group(CreateGroupInput {
            name: "Pair".into(),
            description: String::new(),
            kind: GroupKind::Private,
            invitees: vec![get_fake_id("ben@x.io")],
        })
        .await
        .unwrap();
    ben.session.refresh_profile().await.unwrap();
    let mut pending = ben.invites.pending();
    pending.select_all();
    ben.invites.resolve(Decision::Accept, &mut pending).await.unwrap();

    let mut calendar = ann.group_calendar.load(&group.id).await.unwrap();
    ann.group_calendar
        .add_group_task(&mut calendar, draft("Sync", "10:00", "2024-06-02"), day)
        .await
        .unwrap();

    let me = ann.session.user_id().unwrap();
    let projection = calendar.project(&me, day);
    assert_eq!(projection.member_timings.len(), 1);
    assert_eq!(projection.member_timings[0].username, "ben");
    assert_eq!(projection.member_timings[0].times[0].as_str(), "09:30");
    assert_eq!(projection.marker(day), Some(DayMarker::MemberOnly));

    let next: CalendarDay = "2024-06-02".parse().unwrap();
    assert_eq!(projection.marker(next), Some(DayMarker::GroupTask));
    assert!(projection.group_highlight.is_disjoint(&projection.member_only_highlight));

    ann.shutdown().await;
    ben.shutdown().await;
}

#[tokio::test]
async fn failed_group_fetch_never_asks_for_member_tasks() {
    let world = World::new(&[("ann@x.io", "ann")]);
    let ann = world.sign_in("ann@x.io").await;
    world.backend.set_failing(Endpoint::GetGroup, true);

    assert!(ann.group_calendar.load(&GroupId("missing".into())).await.is_none());
    assert_eq!(world.backend.calls(Endpoint::MembersTaskInfo), 0);
    ann.shutdown().await;
}
