use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use sheetcal_core::sync::resolve_tables;
use sheetcal_core::remote::Remote;
use sheetcal_core::{EventBuilder, TableSource};

use crate::render::Render;
use crate::utils::tui;

async fn fetch_rows(source: &Remote, table: &str) -> Result<Vec<Vec<String>>> {
    let tables = resolve_tables(source, &[table.to_string()]).await?;
    let table_ref = tables
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Table '{}' not found", table))?;
    source
        .get_rows(&table_ref)
        .await
        .with_context(|| format!("Could not read table '{}'", table))
}

/// Build events from one table and print them; never touches a calendar.
pub async fn run(table: &str, json: bool) -> Result<()> {
    let config = super::load_config()?;
    let source = config.source()?;
    let builder = EventBuilder::new(config.build_options()?);

    let spinner = tui::create_spinner(format!("Reading {}", table));
    let rows = fetch_rows(source, table).await;
    spinner.finish_and_clear();
    let rows = rows?;

    let built = builder
        .build_events(&rows, table)
        .with_context(|| format!("Table '{}' has no usable header row", table))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&built.events)?);
        return Ok(());
    }

    println!("{} {}", "Category:".bold(), built.category);
    println!(
        "{} {}",
        "Calendar:".bold(),
        config.sync_settings()?.calendar_name(&built.category)
    );
    println!();

    if built.events.is_empty() {
        println!("{}", "No events".dimmed());
    }
    for event in &built.events {
        println!("  {}", event.render());
    }

    if !built.row_errors.is_empty() {
        println!();
        for error in &built.row_errors {
            println!("  {}", error.render());
        }
    }

    Ok(())
}
