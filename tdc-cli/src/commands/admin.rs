use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::Cell;
use tdc_client::guard::GuardKind;
use tdc_client::OptimisticList;
use tdc_types::NotificationDraft;

use super::auth::print_profile;
use super::{done, print_json, table, yes_no};
use crate::cli::{AdminCommands, NotificationCommands, TeamCommands};
use crate::state::App;

pub async fn run(app: &App, command: AdminCommands) -> Result<()> {
    if !app.require(GuardKind::Admin) {
        return Ok(());
    }
    match command {
        AdminCommands::Teams(command) => teams(app, command).await,
        AdminCommands::Notifications(command) => notifications(app, command).await,
    }
}

async fn teams(app: &App, command: TeamCommands) -> Result<()> {
    match command {
        TeamCommands::List => {
            let teams = app.client.teams().await?;
            if app.json {
                return print_json(&teams);
            }
            if teams.is_empty() {
                println!("{}", "No teams registered.".yellow());
                return Ok(());
            }
            let mut table =
                table(vec!["ID", "Team", "Leader", "Email", "Verified", "Video", "Frozen"]);
            for team in &teams {
                table.add_row(vec![
                    Cell::new(team.id),
                    Cell::new(&team.team_name),
                    Cell::new(&team.leader_name),
                    Cell::new(&team.email),
                    yes_no(team.email_verified),
                    Cell::new(team.latest_video().map_or("-", |v| v.link.as_str())),
                    yes_no(team.video_freeze),
                ]);
            }
            println!("{table}");
            println!("\n{} teams total", teams.len());
        },
        TeamCommands::Show { id } => {
            let team = app.client.team(id).await?;
            if app.json {
                return print_json(&team);
            }
            print_profile(&team);
        },
        TeamCommands::Update { id, team_name, leader_name, email_verified, video_freeze } => {
            let list = OptimisticList::from_items(app.client.teams().await?);
            let mut edited = list.get(id).with_context(|| format!("No team with id {}", id))?;
            if let Some(v) = team_name {
                edited.team_name = v;
            }
            if let Some(v) = leader_name {
                edited.leader_name = v;
            }
            if let Some(v) = email_verified {
                edited.email_verified = v;
            }
            if let Some(v) = video_freeze {
                edited.video_freeze = v;
            }
            let team = app.client.edit_team(&list, edited).await?;
            done(format!("Team {} updated", team.team_name.green()));
        },
        TeamCommands::Delete { id } => {
            let list = OptimisticList::from_items(app.client.teams().await?);
            app.client.remove_team(&list, id).await?;
            done(format!("Team {} deleted", id));
        },
    }
    Ok(())
}

async fn notifications(app: &App, command: NotificationCommands) -> Result<()> {
    match command {
        NotificationCommands::List => {
            let notifications = app.client.notifications().await?;
            if app.json {
                return print_json(&notifications);
            }
            let mut table = table(vec!["ID", "Posted", "Title", "Details"]);
            for n in &notifications {
                table.add_row(vec![
                    Cell::new(n.id),
                    Cell::new(n.created_at.format("%d %b %H:%M")),
                    Cell::new(&n.title),
                    Cell::new(&n.description),
                ]);
            }
            println!("{table}");
        },
        NotificationCommands::Create { title, description } => {
            let list = OptimisticList::from_items(app.client.notifications().await?);
            let created = app
                .client
                .publish_notification(&list, NotificationDraft { title, description })
                .await?;
            done(format!("Announcement #{} published", created.id));
        },
        NotificationCommands::Update { id, title, description } => {
            let list = OptimisticList::from_items(app.client.notifications().await?);
            let mut edited =
                list.get(id).with_context(|| format!("No announcement with id {}", id))?;
            if let Some(v) = title {
                edited.title = v;
            }
            if let Some(v) = description {
                edited.description = v;
            }
            app.client.revise_notification(&list, edited).await?;
            done(format!("Announcement #{} updated", id));
        },
        NotificationCommands::Delete { id } => {
            let list = OptimisticList::from_items(app.client.notifications().await?);
            app.client.retract_notification(&list, id).await?;
            done(format!("Announcement #{} deleted", id));
        },
    }
    Ok(())
}
