use anyhow::{Context, anyhow};
use groupcal::application_port::*;
use groupcal::client::Client;
use groupcal::domain_model::*;
use groupcal::logger::*;
use groupcal::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let client = Client::try_new(&project_settings).await?;
    let result = run(&client, &cli).await;
    client.shutdown().await;
    result
}

async fn run(client: &Client, cli: &Cli) -> anyhow::Result<()> {
    let email = cli.email.clone().context("--email is required")?;
    let password = cli.password.clone().context("--password is required")?;

    let signed_in = match &cli.command {
        Command::Register(args) => {
            let form = RegistrationForm {
                username: args.username.clone(),
                name: args.name.clone(),
                email,
                password,
                confirm_password: args.confirm_password.clone(),
                age: args.age.clone(),
                phone_number: args.phone.clone(),
            };
            client.session.sign_up(&form).await
        }
        _ => client.session.sign_in(&SignInForm { email, password }).await,
    };
    let profile = match signed_in {
        Ok(profile) => profile,
        Err(SessionError::Identity(e)) => return Err(anyhow!(e.user_message())),
        Err(e) => return Err(e.into()),
    };
    info!(username = %profile.username, "signed in");

    match &cli.command {
        Command::Register(_) => println!("Registered {} ({})", profile.username, profile.user_id),
        Command::Today => print_tasks(&client.tasks.today()),
        Command::Calendar { date } => {
            let day = parse_day(date.as_deref())?;
            let projection = client.tasks.tasks_for_day(day);
            println!("{day}:");
            print_tasks(&projection.day_tasks);
            print_days("Days with tasks", &projection.highlighted);
        }
        Command::AddTask(args) => {
            let draft = task_draft(args)?;
            let task = client.tasks.add_task(draft, CalendarDay::today()).await?;
            println!("Added {} on {} at {}", task.title, task.date, task.time);
        }
        Command::CompleteTask { title, time, date } => {
            let day: CalendarDay = date.parse()?;
            let task = client
                .tasks
                .tasks_for_day(day)
                .day_tasks
                .into_iter()
                .find(|t| &t.title == title && t.time.as_str() == time)
                .ok_or_else(|| anyhow!("no task {title:?} at {time} on {day}"))?;
            client.tasks.complete_task(&task).await?;
            println!("Completed {title}");
        }
        Command::Groups => {
            for group in client.groups.list_user_groups().await {
                println!("{}  {} [{}]", group.id, group.name, group.kind);
            }
        }
        Command::Discover { search } => {
            let found = client.groups.list_discoverable_groups().await;
            for group in search_groups(&found, search.as_deref().unwrap_or("")) {
                let summary = group.summary();
                println!("{}  {}  {}", summary.id, summary.name, summary.description);
            }
        }
        Command::CreateGroup {
            name,
            description,
            kind,
            members,
        } => {
            let input = CreateGroupInput {
                name: name.clone(),
                description: description.clone(),
                kind: match kind {
                    KindArg::Private => GroupKind::Private,
                    KindArg::Invite => GroupKind::InviteOnly,
                },
                invitees: members.iter().map(|m| UserId(m.clone())).collect(),
            };
            let created = client.groups.create_group(input).await?;
            println!("Created {} ({})", created.name, created.id);
        }
        Command::RequestJoin { group } => {
            let found = client.groups.list_discoverable_groups().await;
            let target = found
                .iter()
                .find(|g| g.summary().id.0 == *group)
                .ok_or_else(|| anyhow!("{group} is not open for join requests"))?;
            client.groups.request_to_join(target).await?;
            println!("Asked to join {}", target.summary().name);
        }
        Command::GroupCalendar { group, date } => {
            let day = parse_day(date.as_deref())?;
            let calendar = open_group(client, group).await?;
            let projection = calendar.project(&profile.user_id, day);
            println!("{} on {day}:", calendar.group.name);
            print_tasks(&projection.group_tasks);
            for member in &projection.member_timings {
                let times: Vec<_> = member.times.iter().map(TaskTime::as_str).collect();
                println!("  {} busy at {}", member.username, times.join(", "));
            }
            print_days("Group days", &projection.group_highlight);
            print_days("Member-only days", &projection.member_only_highlight);
        }
        Command::AddGroupTask { group, task } => {
            let mut calendar = open_group(client, group).await?;
            let draft = task_draft(task)?;
            let saved = client
                .group_calendar
                .add_group_task(&mut calendar, draft, CalendarDay::today())
                .await?;
            println!("Added {} to {} on {}", saved.title, calendar.group.name, saved.date);
        }
        Command::Notifications => {
            let pending = client.invites.pending();
            if pending.is_empty() {
                println!("Nothing pending");
            }
            for invite in &pending.invites {
                println!("invite   {}  {}", invite.group_id, invite.group_name);
            }
            for request in pending.requests.values().flatten() {
                println!(
                    "request  {}:{}  {} wants to join {}",
                    request.group_id, request.user_id, request.username, request.group_name
                );
            }
        }
        Command::Resolve {
            decision,
            all,
            invites,
            requests,
        } => {
            let mut pending = client.invites.pending();
            if *all {
                pending.select_all();
            }
            for group in invites {
                pending.toggle_invite(&GroupId(group.clone()));
            }
            for pair in requests {
                let (group, user) = pair
                    .split_once(':')
                    .ok_or_else(|| anyhow!("expected group:user, got {pair:?}"))?;
                pending.toggle_request(&GroupId(group.into()), &UserId(user.into()));
            }
            let decision = match decision {
                DecisionArg::Accept => Decision::Accept,
                DecisionArg::Reject => Decision::Reject,
            };
            match client.invites.resolve(decision, &mut pending).await? {
                ResolveOutcome::NothingSelected => println!("Nothing selected"),
                ResolveOutcome::Resolved { invites, requests } => {
                    println!("{decision}: {invites} invite(s), {requests} request(s)")
                }
            }
        }
    }
    Ok(())
}

/// Only groups from the user's own list can be opened.
async fn open_group(client: &Client, group: &str) -> anyhow::Result<GroupCalendar> {
    let summary = client
        .groups
        .list_user_groups()
        .await
        .into_iter()
        .find(|g| g.id.0 == group)
        .ok_or_else(|| anyhow!("{group} is not one of your groups"))?;
    client.session.open_group(&GroupSelection::Member(summary));
    client
        .group_calendar
        .load_active()
        .await?
        .ok_or_else(|| anyhow!("group {group} could not be loaded"))
}

fn parse_day(date: Option<&str>) -> anyhow::Result<CalendarDay> {
    match date {
        Some(date) => Ok(date.parse()?),
        None => Ok(CalendarDay::today()),
    }
}

fn task_draft(args: &TaskArgs) -> anyhow::Result<TaskDraft> {
    Ok(TaskDraft {
        title: args.title.clone(),
        time: args.time.clone(),
        date: args.date.as_deref().map(str::parse).transpose()?,
        content: args.content.clone(),
    })
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in tasks {
        match &task.content {
            Some(content) => println!("  {}  {} - {}", task.time, task.title, content),
            None => println!("  {}  {}", task.time, task.title),
        }
    }
}

fn print_days(label: &str, days: &std::collections::BTreeSet<CalendarDay>) {
    let days: Vec<_> = days.iter().map(CalendarDay::to_string).collect();
    println!("{label}: {}", days.join(" "));
}
