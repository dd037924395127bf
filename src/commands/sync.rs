use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::SyncMode;

pub async fn run(tables: Vec<String>, verbose: bool) -> Result<()> {
    let report = super::run_pass(tables, SyncMode::Apply, verbose).await?;

    let failed = report
        .tables
        .iter()
        .filter(|t| t.status.error().is_some())
        .count();
    if failed > 0 {
        println!(
            "{}",
            format!("{} of {} tables could not be synced", failed, report.tables.len()).yellow()
        );
    }

    Ok(())
}
