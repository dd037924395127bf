mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "sheetcal")]
#[command(about = "Keep calendars in sync with schedule spreadsheets")]
struct Cli {
    /// List every change and raise log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbosity: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync tables into their calendars
    Sync {
        /// Only sync this table (repeatable)
        #[arg(short, long)]
        table: Vec<String>,
    },
    /// Show what a sync would change, without changing anything
    Status {
        /// Only check this table (repeatable)
        #[arg(short, long)]
        table: Vec<String>,
    },
    /// Show the events built from a table
    Parse {
        #[arg(short, long)]
        table: String,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tables available from the source
    Tables,
    /// Show config path and effective settings
    Config,
}

fn init_tracing(verbosity: u8, json: bool) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity, cli.json_logs);
    let verbose = cli.verbosity > 0;

    match cli.command {
        Commands::Sync { table } => commands::sync::run(table, verbose).await,
        Commands::Status { table } => commands::status::run(table, verbose).await,
        Commands::Parse { table, json } => commands::parse::run(&table, json).await,
        Commands::Tables => commands::tables::run().await,
        Commands::Config => commands::config::run(),
    }
}
