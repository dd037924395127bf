use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::SyncMode;

pub async fn run(tables: Vec<String>, verbose: bool) -> Result<()> {
    let report = super::run_pass(tables, SyncMode::DryRun, verbose).await?;

    if !report.tables.is_empty() && !report.has_changes() && !report.has_errors() {
        println!("\n{}", "Everything is up to date".green());
    }

    Ok(())
}
