//! Shopping list CLI command.
//!
//! Prints the list aggregated from every recipe in the current plan.

use clap::Args;

use super::OutputFormat;
use crate::context::Planner;

#[derive(Args)]
pub struct ShoppingCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ShoppingCommand {
    pub fn run(&self, planner: &Planner) -> Result<(), Box<dyn std::error::Error>> {
        let list = planner.shopping_list();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(list)?);
            }
            OutputFormat::Text => {
                if list.is_empty() {
                    print!("{}", list);
                    return Ok(());
                }
                println!("Shopping List");
                println!("=============\n");
                print!("{}", list);
                println!("\nTotal: {} item(s)", list.len());
            }
        }
        Ok(())
    }
}
