use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::SheetCalConfig;
use sheetcal_core::remote::Remote;

fn describe_remote(remote: Option<&Remote>) -> String {
    match remote {
        Some(remote) => {
            let mut keys: Vec<_> = remote.config.0.keys().cloned().collect();
            keys.sort();
            format!("{} ({})", remote.provider.name(), keys.join(", "))
        }
        None => "not configured".dimmed().to_string(),
    }
}

pub fn run() -> Result<()> {
    let config_path = SheetCalConfig::config_path()?;
    let config = super::load_config()?;
    let settings = config.sync_settings()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());

    println!("\n{}", "Remotes".bold());
    println!("  Source:     {}", describe_remote(config.source.as_ref()));
    println!("  Store:      {}", describe_remote(config.store.as_ref()));

    println!("\n{}", "Events".bold());
    println!("  Year:       {}", settings.build.parse.default_year);
    println!("  Timezone:   {}", settings.build.time_zone);
    println!("  Fallback:   {}", settings.build.default_time.format("%H:%M"));
    println!("  Duration:   {}", config.event_duration);
    println!("  Max range:  {} days", settings.build.parse.max_range_days);
    println!(
        "  Calendars:  {}",
        settings.calendar_name("<category>")
    );
    println!("  Timeout:    {}", config.table_timeout);
    if !config.tables.is_empty() {
        println!("  Tables:     {}", config.tables.join(", "));
    }

    Ok(())
}
