use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tdc_types::TeamMember;

#[derive(Parser)]
#[command(
    name = "tdc",
    about = "Thapar Drone Challenge - participant and admin dashboard",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Config file (default: <config dir>/tdc/tdc.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "TDC_API_URL", help = "API base URL")]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Session file (default: <data dir>/tdc/session.json)")]
    pub session_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Output as JSON")]
    pub json: bool,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Register a team and sign in as its leader")]
    Register(RegisterArgs),

    #[command(about = "Sign in")]
    Login {
        #[arg(short, long, help = "Account email")]
        email: String,

        #[arg(short, long, env = "TDC_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, help = "Sign in through the admin portal")]
        admin: bool,
    },

    #[command(about = "Sign out and forget the session")]
    Logout,

    #[command(about = "Show the signed-in team")]
    Whoami,

    #[command(subcommand, about = "One-time codes: email verification and password reset")]
    Otp(OtpCommands),

    #[command(subcommand, about = "View or edit team details")]
    Details(DetailsCommands),

    #[command(subcommand, about = "Video submission")]
    Video(VideoCommands),

    #[command(about = "Announcements for participants")]
    Notifications,

    #[command(subcommand, about = "Support tickets")]
    Tickets(TicketCommands),

    #[command(subcommand, about = "Admin dashboard")]
    Admin(AdminCommands),

    #[command(about = "Check whether a dashboard is reachable with the current session")]
    Guard {
        #[arg(value_enum)]
        dashboard: Dashboard,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Dashboard {
    User,
    Admin,
}

#[derive(clap::Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "TDC_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub team_name: String,

    #[arg(long)]
    pub leader_name: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub institute: Option<String>,

    #[arg(
        long = "member",
        value_parser = parse_member,
        help = "Team member as NAME:EMAIL[:PHONE] (repeatable)"
    )]
    pub members: Vec<TeamMember>,
}

#[derive(Subcommand)]
pub enum OtpCommands {
    #[command(about = "Email a one-time code")]
    Request {
        #[arg(short, long)]
        email: String,
    },

    #[command(about = "Verify the signed-in account's email")]
    Verify {
        #[arg(short, long)]
        email: String,

        #[arg(help = "6-digit code")]
        otp: String,
    },

    #[command(about = "Check a password-reset code")]
    Validate {
        #[arg(short, long)]
        email: String,

        #[arg(help = "6-digit code")]
        otp: String,
    },

    #[command(about = "Set a new password using a code")]
    Reset {
        #[arg(short, long)]
        email: String,

        #[arg(help = "6-digit code")]
        otp: String,

        #[arg(short, long, env = "TDC_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum DetailsCommands {
    #[command(about = "Fetch the team profile from the server")]
    Show,

    #[command(about = "Change team details; only the given fields are sent")]
    Update {
        #[arg(long)]
        team_name: Option<String>,

        #[arg(long)]
        leader_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        institute: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum VideoCommands {
    #[command(about = "Submit a video link")]
    Add {
        #[arg(help = "Public video URL")]
        link: String,
    },

    #[command(about = "Lock in the latest submission (irreversible)")]
    Freeze {
        #[arg(long, help = "Confirm freezing")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TicketCommands {
    #[command(about = "List tickets with unread counts")]
    List,

    #[command(about = "Open a ticket")]
    Create {
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        message: String,
    },

    #[command(about = "Reply on a ticket")]
    Send {
        ticket: i64,

        content: String,
    },

    #[command(about = "Mark a ticket's messages read")]
    Read { ticket: i64 },

    #[command(about = "Close a ticket")]
    Close { ticket: i64 },

    #[command(about = "Follow tickets and print new messages until Ctrl-C")]
    Watch {
        #[arg(help = "Only this ticket")]
        ticket: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(subcommand, about = "Registered teams")]
    Teams(TeamCommands),

    #[command(subcommand, about = "Announcements")]
    Notifications(NotificationCommands),
}

#[derive(Subcommand)]
pub enum TeamCommands {
    #[command(about = "List all teams")]
    List,

    #[command(about = "Show one team")]
    Show { id: i64 },

    #[command(about = "Edit a team")]
    Update {
        id: i64,

        #[arg(long)]
        team_name: Option<String>,

        #[arg(long)]
        leader_name: Option<String>,

        #[arg(long)]
        email_verified: Option<bool>,

        #[arg(long)]
        video_freeze: Option<bool>,
    },

    #[command(about = "Delete a team")]
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    #[command(about = "List announcements")]
    List,

    #[command(about = "Publish an announcement")]
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    #[command(about = "Edit an announcement")]
    Update {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    #[command(about = "Delete an announcement")]
    Delete { id: i64 },
}

fn parse_member(raw: &str) -> Result<TeamMember, String> {
    let mut parts = raw.splitn(3, ':').map(str::trim);
    let name = parts.next().filter(|s| !s.is_empty()).ok_or("missing member name")?;
    let email = parts.next().filter(|s| !s.is_empty()).ok_or("missing member email")?;
    let phone = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(TeamMember { name: name.to_string(), email: email.to_string(), phone })
}
