//! Meal Planner Core Library
//!
//! Recipe library, weekly plan, shopping list aggregation and remote sync
//! shared by the meal planner front ends.

pub mod aggregate;
pub mod app;
pub mod error;
pub mod import;
pub mod library;
pub mod models;
pub mod plan;
pub mod store;
pub mod sync;

pub use aggregate::compute_shopping_list;
pub use app::{Command, MealPlanner, Outcome};
pub use error::PlannerError;
pub use import::{export_library, import_recipes, ImportReport, EXPORT_FILE_NAME};
pub use library::RecipeLibrary;
pub use models::{
    random_empty_message, Day, Ingredient, IngredientDraft, MealType, Recipe, RecipeDraft,
    ShoppingItem, ShoppingList, Unit, EMPTY_LIST_MESSAGES,
};
pub use plan::WeeklyPlan;
pub use store::{LocalStore, StorageError, StoreKey};
pub use sync::{
    GistStore, MemoryStore, RemoteDocument, RemoteError, RemoteStore, SyncCoordinator,
    SyncNotice, SyncStatus,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
