pub mod admin;
pub mod auth;
pub mod profile;
pub mod tickets;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn done(message: impl std::fmt::Display) {
    println!("{} {}", "✓".green(), message);
}

pub(crate) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

pub(crate) fn yes_no(flag: bool) -> comfy_table::Cell {
    use comfy_table::{Cell, Color};
    if flag {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}
