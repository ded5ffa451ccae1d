use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color};
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Arc;
use tdc_client::{OptimisticList, Poller, Tag};
use tdc_types::{CreateTicketRequest, Message, Ticket};

use super::{done, print_json, table};
use crate::cli::TicketCommands;
use crate::state::App;

pub async fn run(app: &App, command: TicketCommands) -> Result<()> {
    if !app.require_signed_in() {
        return Ok(());
    }
    match command {
        TicketCommands::List => list(app).await,
        TicketCommands::Create { subject, message } => {
            let list = OptimisticList::from_items(app.client.tickets().await?);
            let ticket =
                app.client.open_ticket(&list, CreateTicketRequest { subject, message }).await?;
            done(format!("Ticket #{} opened", ticket.id));
            Ok(())
        },
        TicketCommands::Send { ticket, content } => {
            let list = OptimisticList::from_items(app.client.tickets().await?);
            app.client.post_message(&list, ticket, &content).await?;
            done(format!("Message sent on #{}", ticket));
            Ok(())
        },
        TicketCommands::Read { ticket } => {
            let list = OptimisticList::from_items(app.client.tickets().await?);
            let changed = app.client.read_ticket(&list, ticket).await?;
            done(format!("{} message(s) marked read on #{}", changed, ticket));
            Ok(())
        },
        TicketCommands::Close { ticket } => {
            let list = OptimisticList::from_items(app.client.tickets().await?);
            app.client.close_ticket(&list, ticket).await?;
            done(format!("Ticket #{} closed", ticket));
            Ok(())
        },
        TicketCommands::Watch { ticket } => watch(app, ticket).await,
    }
}

async fn list(app: &App) -> Result<()> {
    let tickets = app.client.tickets().await?;
    if app.json {
        return print_json(&tickets);
    }
    if tickets.is_empty() {
        println!("{}", "No tickets.".yellow());
        return Ok(());
    }

    let viewer_is_admin = app.own_dashboard() == tdc_client::GuardKind::Admin;
    let mut table = table(vec!["#", "Subject", "Team", "Status", "Unread", "Last message"]);
    for t in &tickets {
        let status = if t.is_open() {
            Cell::new("Open").fg(Color::Green)
        } else {
            Cell::new("Closed").fg(Color::DarkGrey)
        };
        let unread = t.unread_for(viewer_is_admin);
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.subject),
            Cell::new(t.team_name.as_deref().unwrap_or("-")),
            status,
            if unread > 0 { Cell::new(unread).fg(Color::Yellow) } else { Cell::new("-") },
            Cell::new(t.last_message().map_or("-", |m| m.content.as_str())),
        ]);
    }
    println!("{table}");
    println!("\n{} tickets total", tickets.len());
    Ok(())
}

async fn watch(app: &App, only: Option<i64>) -> Result<()> {
    let list = Arc::new(OptimisticList::from_items(app.client.tickets().await?));
    let mut seen: HashSet<i64> = messages(&list.items(), only).map(|m| m.id).collect();
    let mut changes = list.subscribe();

    let client = app.client.clone();
    let handle = Poller::spawn(list.clone(), client.config().poll_interval(), move || {
        let client = client.clone();
        async move {
            client.cache().invalidate(Tag::Tickets);
            client.tickets().await
        }
        .boxed()
    });

    println!(
        "{} Watching {} (every {}s, Ctrl-C to stop)",
        "●".cyan(),
        only.map_or("all tickets".to_string(), |id| format!("ticket #{}", id)),
        app.client.config().poll_interval().as_secs()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let tickets = list.items();
                for message in messages(&tickets, only) {
                    if message.id > 0 && seen.insert(message.id) {
                        print_message(message);
                    }
                }
            },
        }
    }

    drop(handle);
    println!();
    Ok(())
}

fn messages(tickets: &[Ticket], only: Option<i64>) -> impl Iterator<Item = &Message> {
    tickets
        .iter()
        .filter(move |t| only.map_or(true, |id| id == t.id))
        .flat_map(|t| t.messages.iter())
}

fn print_message(message: &Message) {
    let who = if message.is_admin { "admin".magenta() } else { "team".blue() };
    println!(
        "[{}] #{} {}: {}",
        message.created_at.format("%H:%M:%S"),
        message.ticket,
        who,
        message.content
    );
}
