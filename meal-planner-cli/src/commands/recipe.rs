use clap::{Args, Subcommand};
use std::io::{self, Write};

use super::OutputFormat;
use crate::context::Planner;
use meal_planner_core::{Command, IngredientDraft, MealType, Outcome, Recipe, RecipeDraft};

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Add a recipe to the library
    Add {
        /// Recipe name
        name: String,

        /// Meal type this recipe suits (breakfast, lunch, dinner, snack); can be repeated
        #[arg(long = "category", short = 'c', value_name = "TYPE")]
        categories: Vec<String>,

        /// Ingredient as name:quantity:unit (e.g. "flour:2:cup"); can be repeated
        #[arg(long = "ingredient", short = 'i', value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// Preparation instructions
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Edit a recipe; options that are given replace the stored values
    Edit {
        /// Current recipe name
        name: String,

        /// New name (drops the recipe from the plan)
        #[arg(long)]
        rename: Option<String>,

        /// Replace the meal types; can be repeated
        #[arg(long = "category", short = 'c', value_name = "TYPE")]
        categories: Vec<String>,

        /// Replace the ingredients; can be repeated
        #[arg(long = "ingredient", short = 'i', value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// Replace the instructions (empty string clears them)
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Remove a recipe and every plan entry that uses it
    Remove {
        /// Recipe name
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// List recipes
    List {
        /// Only recipes for this meal type
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show recipe details
    Show {
        /// Recipe name
        name: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search recipe names
    Search {
        /// Text to look for (case-insensitive)
        term: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl RecipeSubcommand {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RecipeSubcommand::Add { .. }
                | RecipeSubcommand::Edit { .. }
                | RecipeSubcommand::Remove { .. }
        )
    }
}

impl RecipeCommand {
    pub fn run(&self, planner: &mut Planner) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::Add {
                name,
                categories,
                ingredients,
                instructions,
            } => {
                let draft = RecipeDraft {
                    name: name.clone(),
                    categories: categories.clone(),
                    ingredients: parse_ingredients(ingredients)?,
                    instructions: instructions.clone().unwrap_or_default(),
                };
                let recipe = draft.into_recipe()?;
                planner.apply(Command::AddRecipe(recipe))?;

                if let Some(recipe) = planner.library().find_by_name(name.trim()) {
                    println!("Added recipe:");
                    println!("{}", recipe);
                }
                Ok(())
            }

            RecipeSubcommand::Edit {
                name,
                rename,
                categories,
                ingredients,
                instructions,
            } => {
                let existing = find(planner, name)?;
                let mut draft = RecipeDraft::from(existing);
                if let Some(new_name) = rename {
                    draft.name = new_name.clone();
                }
                if !categories.is_empty() {
                    draft.categories = categories.clone();
                }
                if !ingredients.is_empty() {
                    draft.ingredients = parse_ingredients(ingredients)?;
                }
                if let Some(text) = instructions {
                    draft.instructions = text.clone();
                }

                let recipe = draft.into_recipe()?;
                let outcome = planner.apply(Command::UpdateRecipe {
                    name: name.clone(),
                    recipe,
                })?;
                if let Outcome::RecipeUpdated {
                    name,
                    references_removed,
                } = outcome
                {
                    println!("Updated recipe: {}", name);
                    if references_removed > 0 {
                        println!(
                            "Removed {} plan entries for the old name",
                            references_removed
                        );
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Remove { name, force } => {
                find(planner, name)?;
                let planned = planner.plan().count_references(name);

                if !force {
                    if planned > 0 {
                        print!("Remove '{}' and its {} plan entries? [y/N] ", name, planned);
                    } else {
                        print!("Remove '{}'? [y/N] ", name);
                    }
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }

                if let Outcome::RecipeRemoved {
                    name,
                    references_removed,
                } = planner.apply(Command::RemoveRecipe(name.clone()))?
                {
                    println!("Removed recipe: {}", name);
                    if references_removed > 0 {
                        println!("Removed {} plan entries", references_removed);
                    }
                }
                Ok(())
            }

            RecipeSubcommand::List { meal_type, format } => {
                let mut recipes = planner.library().sorted();
                if let Some(mt) = meal_type {
                    let meal_type: MealType = mt.parse().map_err(|e: String| e)?;
                    recipes.retain(|r| r.has_category(meal_type));
                }
                print_recipes(&recipes, format)
            }

            RecipeSubcommand::Show { name, format } => {
                let recipe = find(planner, name)?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(recipe)?),
                    OutputFormat::Text => print!("{}", recipe),
                }
                Ok(())
            }

            RecipeSubcommand::Search { term, format } => {
                let mut recipes: Vec<&Recipe> = planner.library().search(term).collect();
                recipes.sort_by_key(|r| r.name.to_lowercase());
                print_recipes(&recipes, format)
            }
        }
    }
}

fn find<'a>(planner: &'a Planner, name: &str) -> Result<&'a Recipe, String> {
    planner
        .library()
        .find_by_name(name)
        .ok_or_else(|| format!("Recipe not found: {}", name))
}

fn parse_ingredients(raw: &[String]) -> Result<Vec<IngredientDraft>, String> {
    raw.iter().map(|s| s.parse()).collect()
}

fn print_recipes(recipes: &[&Recipe], format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(recipes)?);
        }
        OutputFormat::Text => {
            if recipes.is_empty() {
                println!("No recipes found");
                return Ok(());
            }
            for recipe in recipes {
                let types: Vec<&str> = recipe.categories.iter().map(|c| c.as_str()).collect();
                println!(
                    "{:30} {:24} {} ingredient(s)",
                    recipe.name,
                    types.join(", "),
                    recipe.ingredients.len()
                );
            }
            println!("\nTotal: {} recipe(s)", recipes.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients() {
        let drafts = parse_ingredients(&["flour:2:cup".into(), "salt:0.5:tsp".into()]).unwrap();
        assert_eq!(drafts[0], IngredientDraft::new("flour", "2", "cup"));
        assert_eq!(drafts[1].unit, "tsp");
    }

    #[test]
    fn test_parse_ingredients_rejects_missing_parts() {
        let err = parse_ingredients(&["flour".into()]).unwrap_err();
        assert!(err.contains("name:quantity:unit"));
    }
}
