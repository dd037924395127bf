pub mod config;
pub mod parse;
pub mod status;
pub mod sync;
pub mod tables;

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use sheetcal_core::sync::resolve_tables;
use sheetcal_core::{SheetCalConfig, SyncMode, SyncReport, sync_all};

use crate::render::{TableReportRender, render_totals};
use crate::utils::tui;

pub fn load_config() -> Result<SheetCalConfig> {
    let config = SheetCalConfig::load().context("Could not load config")?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// Sync (or preview) the given tables, printing one block per table.
pub async fn run_pass(only: Vec<String>, mode: SyncMode, verbose: bool) -> Result<SyncReport> {
    let config = load_config()?;
    let source = config.source()?.clone();
    let store = config.store()?.clone();
    store
        .provider
        .ensure_installed()
        .context("Calendar store is not available")?;
    let settings = config.sync_settings()?;

    let only = if only.is_empty() { config.tables.clone() } else { only };

    let spinner = tui::create_spinner("Listing tables".to_string());
    let tables = resolve_tables(&source, &only).await;
    spinner.finish_and_clear();
    let tables = tables.context("Could not list tables")?;

    if tables.is_empty() {
        println!("{}", "No tables to sync".dimmed());
        return Ok(SyncReport::default());
    }

    let verb = match mode {
        SyncMode::Apply => "Syncing",
        SyncMode::DryRun => "Checking",
    };
    let spinner = tui::create_spinner(format!("{} {} tables", verb, tables.len()));
    let report = sync_all(
        Arc::new(source),
        Arc::new(store),
        tables,
        Arc::new(settings),
        mode,
    )
    .await;
    spinner.finish_and_clear();

    for (i, table) in report.tables.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", table.render(verbose));
    }

    let totals = report.totals();
    if report.has_changes() || totals.failed > 0 {
        let verb = match mode {
            SyncMode::Apply => "Synced",
            SyncMode::DryRun => "Would sync",
        };
        println!("\n{}", render_totals(&totals, verb));
    }

    Ok(report)
}
