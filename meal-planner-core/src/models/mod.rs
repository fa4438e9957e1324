mod day;
mod ingredient;
mod meal_type;
mod recipe;
mod shopping_item;

pub use day::Day;
pub use ingredient::{Ingredient, Unit};
pub use meal_type::MealType;
pub use recipe::{IngredientDraft, Recipe, RecipeDraft};
pub use shopping_item::{random_empty_message, ShoppingItem, ShoppingList, EMPTY_LIST_MESSAGES};
