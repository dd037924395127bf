use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use sheetcal_core::TableSource;

use crate::utils::tui;

pub async fn run() -> Result<()> {
    let config = super::load_config()?;
    let source = config.source()?;

    let spinner = tui::create_spinner("Listing tables".to_string());
    let tables = source.list_tables().await;
    spinner.finish_and_clear();
    let tables = tables.context("Could not list tables")?;

    if tables.is_empty() {
        println!("{}", "No tables found".dimmed());
        return Ok(());
    }

    for table in tables {
        let selected = config.tables.is_empty() || config.tables.contains(&table.name);
        if selected {
            println!("  {}", table.name);
        } else {
            println!("  {} {}", table.name.dimmed(), "(not in tables)".dimmed());
        }
    }

    Ok(())
}
