//! `tdc` - terminal dashboard for the Thapar Drone Challenge.
//!
//! Talks to the challenge API through `tdc-client`. The session (access
//! token and profile) and the refresh cookie are kept in the user's data
//! directory so consecutive invocations stay signed in.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tdc_client::{ClientError, ErrorKind};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod settings;
mod state;

use cli::{Cli, Commands};
use settings::Settings;
use state::App;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        settings.api_url = url;
    }
    if let Some(path) = cli.session_file {
        settings.session_file = Some(path);
    }

    let app = App::open(&settings, cli.json)?;
    let result = dispatch(&app, cli.command).await;
    app.save_cookies();
    result
}

async fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Register(args) => commands::auth::register(app, args).await,
        Commands::Login { email, password, admin } => {
            commands::auth::login(app, email, password, admin).await
        },
        Commands::Logout => commands::auth::logout(app).await,
        Commands::Whoami => commands::auth::whoami(app),
        Commands::Otp(command) => commands::auth::otp(app, command).await,
        Commands::Details(command) => commands::profile::details(app, command).await,
        Commands::Video(command) => commands::profile::video(app, command).await,
        Commands::Notifications => commands::profile::notifications(app).await,
        Commands::Tickets(command) => commands::tickets::run(app, command).await,
        Commands::Admin(command) => commands::admin::run(app, command).await,
        Commands::Guard { dashboard } => commands::auth::check_guard(app, dashboard),
    }
}

fn report(error: &anyhow::Error) {
    let Some(client_error) = error.downcast_ref::<ClientError>() else {
        eprintln!("{} {:#}", "✗".red(), error);
        return;
    };

    match client_error.kind() {
        ErrorKind::Validation => {
            eprintln!("{} Please fix the following:", "✗".red());
            match client_error.field_errors() {
                Some(fields) => {
                    for (field, messages) in fields {
                        eprintln!("  {}: {}", field.yellow(), messages.join(" "));
                    }
                },
                None => eprintln!("  {}", client_error),
            }
        },
        ErrorKind::AuthExpired => {
            eprintln!("{} Session expired. Run `tdc login` again.", "✗".red());
        },
        ErrorKind::Authorization => eprintln!("{} {}", "✗".red(), client_error),
        ErrorKind::Rollback => {
            eprintln!("{} {} (local changes were reverted)", "✗".red(), client_error);
        },
        ErrorKind::NotFound | ErrorKind::Network | ErrorKind::Server => {
            eprintln!("{} Something went wrong: {}", "✗".red(), client_error);
        },
    }
}
