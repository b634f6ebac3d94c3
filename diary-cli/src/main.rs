use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod scanner;
mod session;

use commands::{
    AddCommand, CalendarCommand, ConfigCommand, DayCommand, DeleteCommand,
    EditCommand, HistoryCommand, SearchCommand, WeekCommand,
};
use config::Config;
use session::Session;

#[derive(Parser)]
#[command(name = "diary")]
#[command(version)]
#[command(about = "A food diary with per-portion macro tracking", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the entries and totals of a day
    Day(DayCommand),

    /// Search for a product and log a portion of it
    Add(AddCommand),

    /// Change the weight or macros of an entry
    Edit(EditCommand),

    /// Remove an entry
    Delete(DeleteCommand),

    /// Search products by name or barcode
    Search(SearchCommand),

    /// Show recent searches
    History(HistoryCommand),

    /// Show calories for the seven days around a date
    Week(WeekCommand),

    /// Show a month with the days that have entries
    Calendar(CalendarCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "error".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    tracing::debug!(
        data_dir = %config.data_dir.value.display(),
        backend = config.backend.is_configured(),
        "configuration loaded"
    );

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };
    if let Commands::Config(cmd) = &command {
        return cmd.run(&config, cli_config_path);
    }

    let mut session = Session::open(&config, diary_core::dates::today())?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute_command(&command, &mut session))
}

async fn execute_command(
    command: &Commands,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Day(cmd) => cmd.run(session).await,
        Commands::Add(cmd) => cmd.run(session).await,
        Commands::Edit(cmd) => cmd.run(session).await,
        Commands::Delete(cmd) => cmd.run(session).await,
        Commands::Search(cmd) => cmd.run(session).await,
        Commands::History(cmd) => cmd.run(session),
        Commands::Week(cmd) => cmd.run(session).await,
        Commands::Calendar(cmd) => cmd.run(session),
        Commands::Config(_) => Ok(()),
    }
}
