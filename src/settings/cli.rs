use super::Parser;
use clap::{Args, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "groupcal", about = "Personal and group task calendar")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    #[arg(long, env = "GROUPCAL_EMAIL")]
    pub email: Option<String>,
    #[arg(long, env = "GROUPCAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tasks due today.
    Today,
    /// Tasks on a day plus every day that has tasks.
    Calendar {
        #[arg(long)]
        date: Option<String>,
    },
    AddTask(TaskArgs),
    /// Completing a task removes it.
    CompleteTask {
        #[arg(long)]
        title: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        date: String,
    },
    /// Groups you belong to.
    Groups,
    /// Invite-only groups you could ask to join.
    Discover {
        #[arg(long)]
        search: Option<String>,
    },
    CreateGroup {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    RequestJoin {
        #[arg(long)]
        group: String,
    },
    GroupCalendar {
        #[arg(long)]
        group: String,
        #[arg(long)]
        date: Option<String>,
    },
    AddGroupTask {
        #[arg(long)]
        group: String,
        #[command(flatten)]
        task: TaskArgs,
    },
    /// Pending group invites and join requests.
    Notifications,
    Resolve {
        #[arg(value_enum)]
        decision: DecisionArg,
        /// Resolve everything instead of the listed ids.
        #[arg(long)]
        all: bool,
        /// Group ids of invites to resolve.
        #[arg(long = "invite")]
        invites: Vec<String>,
        /// `group:user` pairs of join requests to resolve.
        #[arg(long = "request")]
        requests: Vec<String>,
    },
    Register(RegisterArgs),
}

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long, default_value = "")]
    pub content: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub confirm_password: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Private,
    Invite,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DecisionArg {
    Accept,
    Reject,
}
