use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

use crate::context::Planner;
use meal_planner_core::{Command, Outcome, EXPORT_FILE_NAME};

#[derive(Args)]
pub struct LibraryCommand {
    #[command(subcommand)]
    pub command: LibrarySubcommand,
}

#[derive(Subcommand)]
pub enum LibrarySubcommand {
    /// Write the recipe library as JSON
    Export {
        /// Output file (default: meal-library.json; "-" for stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge recipes from an exported JSON file
    Import {
        /// File to read
        file: PathBuf,
    },
}

impl LibrarySubcommand {
    pub fn is_write(&self) -> bool {
        matches!(self, LibrarySubcommand::Import { .. })
    }
}

impl LibraryCommand {
    pub fn run(&self, planner: &mut Planner) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LibrarySubcommand::Export { output } => {
                let json = planner.export_library()?;
                let path = output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
                if path.as_os_str() == "-" {
                    println!("{}", json);
                } else {
                    fs::write(&path, json)?;
                    println!(
                        "Exported {} recipe(s) to {}",
                        planner.library().len(),
                        path.display()
                    );
                }
                Ok(())
            }

            LibrarySubcommand::Import { file } => {
                let json = fs::read_to_string(file)
                    .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
                if let Outcome::Imported(report) = planner.apply(Command::ImportRecipes(json))? {
                    println!("{}", report);
                }
                Ok(())
            }
        }
    }
}
