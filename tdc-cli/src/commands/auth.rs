use anyhow::Result;
use colored::Colorize;
use tdc_client::guard::{self, GuardKind};
use tdc_types::{LoginRequest, RegisterRequest, ResetPasswordRequest, UserProfile, VerifyOtpRequest};

use super::{done, print_json};
use crate::cli::{Dashboard, OtpCommands, RegisterArgs};
use crate::state::App;

pub async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    let form = RegisterRequest {
        email: args.email,
        password: args.password,
        team_name: args.team_name,
        leader_name: args.leader_name,
        phone: args.phone,
        institute: args.institute,
        members: args.members,
    };
    let user = app.client.register(&form).await?;
    done(format!("Team {} registered", user.team_name.green()));
    next_step(app);
    Ok(())
}

pub async fn login(app: &App, email: String, password: String, admin: bool) -> Result<()> {
    let form = LoginRequest { email, password };
    let user = if admin {
        app.client.admin_login(&form).await?
    } else {
        app.client.login(&form).await?
    };
    done(format!("Signed in as {}", user.email.green()));
    next_step(app);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.client.logout().await?;
    done("Signed out");
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    if !app.require_signed_in() {
        return Ok(());
    }
    let Some(user) = app.client.session().user() else {
        return Ok(());
    };
    if app.json {
        return print_json(&user);
    }
    print_profile(&user);
    Ok(())
}

pub async fn otp(app: &App, command: OtpCommands) -> Result<()> {
    match command {
        OtpCommands::Request { email } => {
            app.client.request_otp(&email).await?;
            done(format!("Code sent to {}", email));
        },
        OtpCommands::Verify { email, otp } => {
            app.client.verify_email(&VerifyOtpRequest { email, otp }).await?;
            done("Email verified");
            next_step(app);
        },
        OtpCommands::Validate { email, otp } => {
            app.client.validate_otp(&VerifyOtpRequest { email, otp }).await?;
            done("Code accepted");
        },
        OtpCommands::Reset { email, otp, password } => {
            app.client.reset_password(&ResetPasswordRequest { email, otp, password }).await?;
            done("Password changed; sign in again");
        },
    }
    Ok(())
}

pub fn check_guard(app: &App, dashboard: Dashboard) -> Result<()> {
    let kind = match dashboard {
        Dashboard::User => GuardKind::User,
        Dashboard::Admin => GuardKind::Admin,
    };
    let decision = guard::enforce(kind, app.client.session(), kind.path());
    if app.json {
        return print_json(&serde_json::json!({
            "location": kind.path(),
            "allowed": decision.allows(),
            "redirect": decision.redirect(),
        }));
    }
    match decision.redirect() {
        None => done(format!("{} renders", kind.path())),
        Some(target) => println!("{} {} -> {}", "✗".red(), kind.path(), target.yellow()),
    }
    Ok(())
}

pub(crate) fn print_profile(user: &UserProfile) {
    println!("{}", user.team_name.cyan().bold());
    println!("  Email:     {}", user.email);
    println!("  Leader:    {}", user.leader_name);
    println!("  Phone:     {}", user.phone.as_deref().unwrap_or("-"));
    println!("  Institute: {}", user.institute.as_deref().unwrap_or("-"));
    println!("  Role:      {:?}", user.role());
    println!(
        "  Verified:  {}",
        if user.email_verified { "yes".green() } else { "no".red() }
    );
    for member in &user.members {
        println!("  Member:    {} <{}>", member.name, member.email);
    }
    match user.latest_video() {
        Some(video) => {
            let state = if user.video_freeze { "frozen".red() } else { "open".green() };
            println!("  Video:     {} ({})", video.link, state);
        },
        None => println!("  Video:     -"),
    }
}

fn next_step(app: &App) {
    let home = app.client.session().access_state().home();
    println!("  Next: {}", home.cyan());
}
