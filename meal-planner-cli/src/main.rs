use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;

use commands::{
    ConfigCommand, LibraryCommand, PlanCommand, RecipeCommand, ShoppingCommand, SyncCommand,
};
use config::Config;
use context::Planner;

#[derive(Parser)]
#[command(name = "mealplan")]
#[command(version)]
#[command(about = "Plan a week of meals and build the shopping list", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the recipe library
    Recipe(RecipeCommand),

    /// Manage the weekly plan
    Plan(PlanCommand),

    /// Show the shopping list for the planned week
    Shopping(ShoppingCommand),

    /// Export or import the recipe library
    Library(LibraryCommand),

    /// Sync with the remote gist
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

impl Commands {
    /// Returns true if the command changes the plan or library.
    fn is_write(&self) -> bool {
        match self {
            Commands::Recipe(cmd) => cmd.command.is_write(),
            Commands::Plan(cmd) => cmd.command.is_write(),
            Commands::Library(cmd) => cmd.command.is_write(),
            Commands::Shopping(_) | Commands::Sync(_) | Commands::Config(_) => false,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "error".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config, cli_config_path),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let mut planner = context::open(&config).await;
    let result = execute_command(&command, &mut planner, &config).await;

    // Let the debounced push land before the process exits
    if command.is_write() && planner.sync().is_pending() {
        eprintln!("Saving to remote...");
    }
    planner.settle().await;

    for notice in planner.drain_notices() {
        eprintln!("Warning: {}", notice);
    }

    result
}

async fn execute_command(
    command: &Commands,
    planner: &mut Planner,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Recipe(cmd) => cmd.run(planner)?,
        Commands::Plan(cmd) => cmd.run(planner)?,
        Commands::Shopping(cmd) => cmd.run(planner)?,
        Commands::Library(cmd) => cmd.run(planner)?,
        Commands::Sync(cmd) => cmd.run(planner, config).await?,
        Commands::Config(_) => {}
    }
    Ok(())
}
