use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ingredient::{Ingredient, Unit};
use super::meal_type::MealType;
use crate::error::PlannerError;

/// A named dish in the recipe library. The name is its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub name: String,
    pub categories: BTreeSet<MealType>,
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: BTreeSet::new(),
            ingredients: Vec::new(),
            instructions: None,
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = MealType>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = if instructions.trim().is_empty() {
            None
        } else {
            Some(instructions)
        };
        self
    }

    pub fn has_category(&self, category: MealType) -> bool {
        self.categories.contains(&category)
    }

    /// Checks the invariants every stored recipe must satisfy.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::validation("name", "recipe name is required"));
        }
        if self.categories.is_empty() {
            return Err(PlannerError::validation(
                "categories",
                "select at least one meal type",
            ));
        }
        if self.ingredients.is_empty() {
            return Err(PlannerError::validation(
                "ingredients",
                "add at least one ingredient",
            ));
        }
        for (i, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.name.trim().is_empty() {
                return Err(PlannerError::validation(
                    format!("ingredients[{}].name", i),
                    "ingredient name is required",
                ));
            }
            if !ingredient.quantity.is_finite() || ingredient.quantity <= 0.0 {
                return Err(PlannerError::validation(
                    format!("ingredients[{}].quantity", i),
                    "quantity must be a positive number",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;

        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        writeln!(f, "Meal types: {}", categories.join(", "))?;

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if let Some(instructions) = self.instructions.as_deref().filter(|i| !i.is_empty()) {
            writeln!(f, "\nInstructions:\n{}", instructions)?;
        }

        Ok(())
    }
}

/// One ingredient row exactly as entered in a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientDraft {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

impl IngredientDraft {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
        }
    }
}

impl FromStr for IngredientDraft {
    type Err = String;

    /// Parses `name:quantity:unit`. The name may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let unit = parts.next().unwrap_or_default();
        let quantity = parts.next();
        let name = parts.next();
        match (name, quantity) {
            (Some(name), Some(quantity)) => Ok(Self::new(name, quantity, unit)),
            _ => Err(format!(
                "Invalid ingredient '{}'. Expected name:quantity:unit",
                s
            )),
        }
    }
}

/// Unvalidated recipe input, as a UI collects it.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub name: String,
    pub categories: Vec<String>,
    pub ingredients: Vec<IngredientDraft>,
    pub instructions: String,
}

impl RecipeDraft {
    /// Validates the draft and builds a [`Recipe`].
    ///
    /// The first problem found is reported, naming the offending field.
    pub fn into_recipe(self) -> Result<Recipe, PlannerError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(PlannerError::validation("name", "recipe name is required"));
        }

        let mut categories = BTreeSet::new();
        for raw in &self.categories {
            let category = MealType::from_str(raw)
                .map_err(|e| PlannerError::validation("categories", e))?;
            categories.insert(category);
        }
        if categories.is_empty() {
            return Err(PlannerError::validation(
                "categories",
                "select at least one meal type",
            ));
        }

        if self.ingredients.is_empty() {
            return Err(PlannerError::validation(
                "ingredients",
                "add at least one ingredient",
            ));
        }
        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for (i, draft) in self.ingredients.iter().enumerate() {
            let ingredient_name = draft.name.trim();
            if ingredient_name.is_empty() {
                return Err(PlannerError::validation(
                    format!("ingredients[{}].name", i),
                    "ingredient name is required",
                ));
            }
            let quantity = draft
                .quantity
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|q| q.is_finite() && *q > 0.0)
                .ok_or_else(|| {
                    PlannerError::validation(
                        format!("ingredients[{}].quantity", i),
                        format!("'{}' is not a positive number", draft.quantity),
                    )
                })?;
            if draft.unit.trim().is_empty() {
                return Err(PlannerError::validation(
                    format!("ingredients[{}].unit", i),
                    "unit is required",
                ));
            }
            let unit = Unit::from_str(&draft.unit)
                .map_err(|e| PlannerError::validation(format!("ingredients[{}].unit", i), e))?;
            ingredients.push(Ingredient::new(ingredient_name, quantity, unit));
        }

        Ok(Recipe {
            name,
            categories,
            ingredients,
            instructions: None,
        }
        .with_instructions(self.instructions.trim()))
    }
}

impl From<&Recipe> for RecipeDraft {
    /// Pre-fills a draft for editing an existing recipe.
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            categories: recipe.categories.iter().map(|c| c.to_string()).collect(),
            ingredients: recipe
                .ingredients
                .iter()
                .map(|i| IngredientDraft::new(&i.name, i.quantity.to_string(), i.unit.as_str()))
                .collect(),
            instructions: recipe.instructions.clone().unwrap_or_default(),
        }
    }
}
