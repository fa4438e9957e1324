//! The recipe library.
//!
//! Recipes are identified by name. Uniqueness is enforced ignoring case, but
//! [`RecipeLibrary::find_by_name`] is an exact match: plan references store the
//! name exactly as it was stored in the library.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::models::{MealType, Recipe};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RecipeLibrary {
    recipes: Vec<Recipe>,
}

impl RecipeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a library from recipes read back from storage or a remote.
    ///
    /// Entries are re-checked as `add` would check them. Invalid entries and
    /// names already taken (ignoring case) are dropped with a warning; the
    /// number dropped is returned alongside the library.
    pub fn from_stored(recipes: Vec<Recipe>) -> (Self, usize) {
        let mut library = Self::new();
        let mut skipped = 0;
        for recipe in recipes {
            let name = recipe.name.clone();
            if let Err(e) = library.add(recipe) {
                tracing::warn!("Dropping stored recipe '{}': {}", name, e);
                skipped += 1;
            }
        }
        (library, skipped)
    }

    /// Re-checks every entry, see [`RecipeLibrary::from_stored`].
    pub fn revalidated(self) -> (Self, usize) {
        Self::from_stored(self.recipes)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }

    /// Adds a recipe after validating it.
    pub fn add(&mut self, recipe: Recipe) -> Result<(), PlannerError> {
        recipe.validate()?;
        if self.contains_ignore_case(&recipe.name) {
            return Err(PlannerError::DuplicateName(recipe.name));
        }
        self.recipes.push(recipe);
        Ok(())
    }

    /// Replaces the recipe stored under `name`.
    ///
    /// Returns the replaced recipe, or `None` if `name` no longer exists (in
    /// which case nothing changes). A changed name must not collide with any
    /// other entry.
    pub fn update(&mut self, name: &str, recipe: Recipe) -> Result<Option<Recipe>, PlannerError> {
        recipe.validate()?;
        let Some(index) = self.position(name) else {
            return Ok(None);
        };
        let lower = recipe.name.to_lowercase();
        let collides = self
            .recipes
            .iter()
            .enumerate()
            .any(|(i, r)| i != index && r.name.to_lowercase() == lower);
        if collides {
            return Err(PlannerError::DuplicateName(recipe.name));
        }
        Ok(Some(std::mem::replace(&mut self.recipes[index], recipe)))
    }

    /// Removes a recipe, returning its name so plan references can be dropped.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.position(name)?;
        Some(self.recipes.remove(index).name)
    }

    /// Exact, case-sensitive lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// Case-insensitive membership test used for uniqueness.
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.recipes.iter().any(|r| r.name.to_lowercase() == lower)
    }

    /// Recipes tagged with `category`, in insertion order.
    ///
    /// The returned iterator is lazy and can be cloned to restart it.
    pub fn filter_by_category(
        &self,
        category: MealType,
    ) -> impl Iterator<Item = &Recipe> + Clone + '_ {
        self.recipes
            .iter()
            .filter(move |r| r.has_category(category))
    }

    /// Recipes whose name or any ingredient name contains `term`, ignoring case.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Recipe> + Clone + 'a {
        let needle = term.trim().to_lowercase();
        self.recipes.iter().filter(move |r| {
            r.name.to_lowercase().contains(&needle)
                || r
                    .ingredients
                    .iter()
                    .any(|i| i.name.to_lowercase().contains(&needle))
        })
    }

    /// Recipes ordered by name, ignoring case.
    pub fn sorted(&self) -> Vec<&Recipe> {
        let mut recipes: Vec<&Recipe> = self.recipes.iter().collect();
        recipes.sort_by_key(|r| r.name.to_lowercase());
        recipes
    }

    /// Names of the recipes offered for a meal slot, ordered by name.
    pub fn names_for(&self, slot: MealType) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .filter_by_category(slot)
            .map(|r| r.name.as_str())
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.recipes.iter().position(|r| r.name == name)
    }
}

impl<'a> IntoIterator for &'a RecipeLibrary {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipes.iter()
    }
}
