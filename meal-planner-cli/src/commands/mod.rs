use clap::ValueEnum;

mod config_cmd;
mod library;
mod plan;
mod recipe;
mod shopping;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use library::LibraryCommand;
pub use plan::PlanCommand;
pub use recipe::RecipeCommand;
pub use shopping::ShoppingCommand;
pub use sync_cmd::SyncCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
