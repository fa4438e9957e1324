use clap::{Args, Subcommand};
use serde::Serialize;

use super::OutputFormat;
use crate::context::Planner;
use meal_planner_core::{Command, Day, MealType, Outcome, WeeklyPlan};

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Put a recipe in a day's meal slot
    Assign {
        /// Day (sunday..saturday, or snacks)
        day: String,

        /// Meal slot (breakfast, lunch, dinner, snack)
        slot: String,

        /// Recipe name
        recipe: String,
    },

    /// Take a recipe out of a day's meal slot
    Unassign {
        /// Day (sunday..saturday, or snacks)
        day: String,

        /// Meal slot (breakfast, lunch, dinner, snack)
        slot: String,

        /// Recipe name
        recipe: String,
    },

    /// Empty every slot of a day
    Clear {
        /// Day (sunday..saturday, or snacks)
        day: String,
    },

    /// Show the week
    Show {
        /// Only this day
        #[arg(long, short)]
        day: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl PlanSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(self, PlanSubcommand::Show { .. })
    }
}

impl PlanCommand {
    pub fn run(&self, planner: &mut Planner) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlanSubcommand::Assign { day, slot, recipe } => {
                let (day, slot) = (parse_day(day)?, parse_slot(slot)?);
                planner.apply(Command::Assign {
                    day,
                    slot,
                    recipe: recipe.clone(),
                })?;
                println!("Planned {} for {} {}", recipe, day, slot);
                Ok(())
            }

            PlanSubcommand::Unassign { day, slot, recipe } => {
                let (day, slot) = (parse_day(day)?, parse_slot(slot)?);
                match planner.apply(Command::Unassign {
                    day,
                    slot,
                    recipe: recipe.clone(),
                })? {
                    Outcome::Unassigned(_) => println!("Removed {} from {} {}", recipe, day, slot),
                    _ => println!("{} is not planned for {} {}", recipe, day, slot),
                }
                Ok(())
            }

            PlanSubcommand::Clear { day } => {
                let day = parse_day(day)?;
                match planner.apply(Command::ClearDay(day))? {
                    Outcome::DayCleared(n) => println!("Cleared {} ({} meal(s) removed)", day, n),
                    _ => println!("{} is already empty", day),
                }
                Ok(())
            }

            PlanSubcommand::Show { day, format } => {
                let days: Vec<Day> = match day {
                    Some(d) => vec![parse_day(d)?],
                    None => planner.plan().days().collect(),
                };

                match format {
                    OutputFormat::Json => {
                        let view: Vec<DayView> =
                            days.iter().map(|d| DayView::new(planner.plan(), *d)).collect();
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        for (i, d) in days.iter().enumerate() {
                            if i > 0 {
                                println!();
                            }
                            print_day(planner.plan(), *d);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct DayView<'a> {
    day: Day,
    meals: Vec<SlotView<'a>>,
}

#[derive(Serialize)]
struct SlotView<'a> {
    slot: MealType,
    recipes: &'a [String],
}

impl<'a> DayView<'a> {
    fn new(plan: &'a WeeklyPlan, day: Day) -> Self {
        Self {
            day,
            meals: plan
                .slots(day)
                .map(|(slot, recipes)| SlotView { slot, recipes })
                .collect(),
        }
    }
}

fn print_day(plan: &WeeklyPlan, day: Day) {
    println!("{}", day);
    println!("{}", "-".repeat(day.as_str().len()));
    if plan.is_day_empty(day) {
        println!("  (nothing planned)");
        return;
    }
    for (slot, recipes) in plan.slots(day) {
        let names = if recipes.is_empty() {
            "-".to_string()
        } else {
            recipes.join(", ")
        };
        println!("  {:10} {}", slot.as_str(), names);
    }
}

fn parse_day(raw: &str) -> Result<Day, String> {
    raw.parse()
}

fn parse_slot(raw: &str) -> Result<MealType, String> {
    raw.parse()
}
