use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::Cell;
use tdc_client::guard::GuardKind;

use super::auth::print_profile;
use super::{done, print_json, table};
use crate::cli::{DetailsCommands, VideoCommands};
use crate::state::App;

pub async fn details(app: &App, command: DetailsCommands) -> Result<()> {
    if !app.require(GuardKind::User) {
        return Ok(());
    }
    match command {
        DetailsCommands::Show => {
            let user = app.client.user_details().await?;
            if app.json {
                return print_json(&user);
            }
            print_profile(&user);
        },
        DetailsCommands::Update { team_name, leader_name, phone, institute } => {
            let Some(mut edited) = app.client.session().user() else {
                bail!("No profile in session");
            };
            if let Some(v) = team_name {
                edited.team_name = v;
            }
            if let Some(v) = leader_name {
                edited.leader_name = v;
            }
            if let Some(v) = phone {
                edited.phone = Some(v);
            }
            if let Some(v) = institute {
                edited.institute = Some(v);
            }
            let user = app.client.edit_details(&edited).await?;
            if app.json {
                return print_json(&user);
            }
            done("Details saved");
        },
    }
    Ok(())
}

pub async fn video(app: &App, command: VideoCommands) -> Result<()> {
    if !app.require(GuardKind::User) {
        return Ok(());
    }
    match command {
        VideoCommands::Add { link } => {
            let video = app.client.add_video(&link).await?;
            done(format!("Video submitted: {}", video.link));
        },
        VideoCommands::Freeze { yes } => {
            if !yes {
                bail!("Freezing is permanent; pass --yes to confirm");
            }
            app.client.freeze_video().await?;
            done("Video submission frozen");
        },
    }
    Ok(())
}

pub async fn notifications(app: &App) -> Result<()> {
    if !app.require(GuardKind::User) {
        return Ok(());
    }
    let notifications = app.client.user_notifications().await?;
    if app.json {
        return print_json(&notifications);
    }
    if notifications.is_empty() {
        println!("{}", "No announcements yet.".yellow());
        return Ok(());
    }

    let mut table = table(vec!["Posted", "Title", "Details"]);
    for n in &notifications {
        table.add_row(vec![
            Cell::new(n.created_at.format("%d %b %H:%M")),
            Cell::new(&n.title),
            Cell::new(&n.description),
        ]);
    }
    println!("{table}");
    Ok(())
}
