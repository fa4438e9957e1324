//! Sync CLI commands for the remote gist document.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::context::Planner;
use meal_planner_core::{MealPlanner, PlannerError, RemoteError, RemoteStore, SyncNotice, SyncStatus};

/// Sync with the remote gist
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and connection status
    Status,

    /// Replace local data with the remote document
    Pull,

    /// Write local data to the remote document now
    Push,
}

impl SyncCommand {
    pub async fn run(&self, planner: &mut Planner, config: &Config) -> Result<(), SyncCommandError> {
        match &self.command {
            None | Some(SyncSubcommand::Status) => {
                self.status(planner, config);
                Ok(())
            }
            Some(SyncSubcommand::Pull) => self.pull(planner).await,
            Some(SyncSubcommand::Push) => self.push(planner).await,
        }
    }

    fn status(&self, planner: &Planner, config: &Config) {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    gist_id: \"<gist id>\"");
            println!("    token: \"<token with gist scope>\"");
            println!();
            println!("Or set environment variables:");
            println!("  MEALPLAN_GIST_ID, MEALPLAN_GIST_TOKEN");
            return;
        }

        let gist_id = config.sync.gist_id.as_deref().unwrap_or_default();
        println!("Gist:      {}", gist_id);
        println!("File:      {}", config.sync.file_name());
        println!("API:       {}", config.sync.api_url());
        println!("Debounce:  {} ms", config.sync.debounce_window().as_millis());
        println!();

        match planner.sync().status() {
            SyncStatus::Connected => println!("Remote status: ✓ connected"),
            SyncStatus::Degraded => println!("Remote status: ✗ unreachable (working offline)"),
            SyncStatus::Unconfigured => println!("Remote status: not configured"),
        }
    }

    async fn pull(&self, planner: &mut Planner) -> Result<(), SyncCommandError> {
        ensure_connected(planner)?;
        match pull_remote(planner).await? {
            Some(count) => println!("✓ Pulled {} recipe(s) from remote", count),
            None => println!("Remote has no data; local data unchanged."),
        }
        Ok(())
    }

    async fn push(&self, planner: &Planner) -> Result<(), SyncCommandError> {
        ensure_connected(planner)?;
        planner.push_now().await?;
        println!("✓ Pushed {} recipe(s) to remote", planner.library().len());
        Ok(())
    }
}

/// Pulls and adopts the remote document.
///
/// Returns the adopted recipe count, or `None` when the remote holds no
/// document. A failed read surfaces as an error instead of `None`.
async fn pull_remote<S: RemoteStore>(
    planner: &mut MealPlanner<S>,
) -> Result<Option<usize>, SyncCommandError> {
    if planner.pull_now().await? {
        return Ok(Some(planner.library().len()));
    }
    let mut failure = None;
    for notice in planner.drain_notices() {
        match notice {
            SyncNotice::PullFailed(e) => failure = Some(e),
            other => tracing::warn!("{}", other),
        }
    }
    match failure {
        Some(e) => Err(SyncCommandError::Remote(e)),
        None => Ok(None),
    }
}

fn ensure_connected(planner: &Planner) -> Result<(), SyncCommandError> {
    match planner.sync().status() {
        SyncStatus::Connected => Ok(()),
        SyncStatus::Unconfigured => Err(SyncCommandError::NotConfigured),
        SyncStatus::Degraded => Err(SyncCommandError::Remote(RemoteError::NotConnected)),
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    NotConfigured,
    Remote(RemoteError),
    Planner(PlannerError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::NotConfigured => write!(
                f,
                "Sync not configured. Set sync.gist_id and sync.token in config."
            ),
            SyncCommandError::Remote(e) => write!(f, "{}", e),
            SyncCommandError::Planner(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::NotConfigured => None,
            SyncCommandError::Remote(e) => Some(e),
            SyncCommandError::Planner(e) => Some(e),
        }
    }
}

impl From<RemoteError> for SyncCommandError {
    fn from(e: RemoteError) -> Self {
        SyncCommandError::Remote(e)
    }
}

impl From<PlannerError> for SyncCommandError {
    fn from(e: PlannerError) -> Self {
        SyncCommandError::Planner(e)
    }
}
