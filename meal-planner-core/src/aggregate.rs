//! Shopping list aggregation.

use std::collections::{BTreeSet, HashMap};

use crate::library::RecipeLibrary;
use crate::models::{ShoppingItem, ShoppingList};
use crate::plan::WeeklyPlan;

/// Builds the shopping list for everything planned this week.
///
/// Ingredients are grouped by lowercased name and unit. Quantities are summed
/// once per planned reference, while each recipe is credited once per item no
/// matter how many slots it fills. Names that do not resolve in the library are
/// skipped. Items are ordered by name ignoring case; ties keep first-seen order.
pub fn compute_shopping_list(plan: &WeeklyPlan, library: &RecipeLibrary) -> ShoppingList {
    let mut items: Vec<ShoppingItem> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for (_, _, name) in plan.references() {
        let Some(recipe) = library.find_by_name(name) else {
            continue;
        };

        for ingredient in &recipe.ingredients {
            let key = (
                ingredient.name.to_lowercase(),
                ingredient.unit.as_str().to_lowercase(),
            );
            let i = *index.entry(key).or_insert_with(|| {
                items.push(ShoppingItem {
                    name: ingredient.name.clone(),
                    unit: ingredient.unit,
                    quantity: 0.0,
                    source_recipes: BTreeSet::new(),
                });
                items.len() - 1
            });
            let item = &mut items[i];
            item.quantity += ingredient.quantity;
            item.source_recipes.insert(recipe.name.clone());
        }
    }

    items.sort_by_key(|item| item.name.to_lowercase());
    ShoppingList::new(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Ingredient, MealType, Recipe, Unit};

    fn recipe(name: &str, ingredients: &[(&str, f64, Unit)]) -> Recipe {
        Recipe::new(name)
            .with_categories(MealType::MEALS)
            .with_ingredients(
                ingredients
                    .iter()
                    .map(|(n, q, u)| Ingredient::new(*n, *q, *u))
                    .collect(),
            )
    }

    fn library(recipes: Vec<Recipe>) -> RecipeLibrary {
        let mut library = RecipeLibrary::new();
        for r in recipes {
            library.add(r).unwrap();
        }
        library
    }

    #[test]
    fn test_flour_from_two_recipes() {
        let library = library(vec![
            recipe("A", &[("flour", 2.0, Unit::Cup)]),
            recipe("B", &[("flour", 1.0, Unit::Cup)]),
        ]);
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Sunday, MealType::Breakfast, "A").unwrap();
        plan.assign(Day::Monday, MealType::Lunch, "B").unwrap();

        let list = compute_shopping_list(&plan, &library);
        assert_eq!(list.len(), 1);
        let flour = &list.items()[0];
        assert_eq!(flour.name, "flour");
        assert_eq!(flour.unit, Unit::Cup);
        assert_eq!(flour.quantity, 3.0);
        assert_eq!(
            flour.source_recipes,
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_repeated_recipe_sums_quantity_but_credits_once() {
        let library = library(vec![recipe("Oats", &[("oats", 1.0, Unit::Cup)])]);
        let mut plan = WeeklyPlan::default();
        for day in [Day::Monday, Day::Tuesday, Day::Wednesday] {
            plan.assign(day, MealType::Breakfast, "Oats").unwrap();
        }

        let list = compute_shopping_list(&plan, &library);
        assert_eq!(list.items()[0].quantity, 3.0);
        assert_eq!(list.items()[0].source_recipes.len(), 1);
    }

    #[test]
    fn test_same_name_different_units_stay_separate() {
        let library = library(vec![
            recipe("Cookies", &[("Sugar", 1.0, Unit::Cup)]),
            recipe("Tea", &[("sugar", 2.0, Unit::Tsp)]),
        ]);
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Friday, MealType::Dinner, "Cookies").unwrap();
        plan.assign(Day::Friday, MealType::Breakfast, "Tea").unwrap();

        let list = compute_shopping_list(&plan, &library);
        assert_eq!(list.len(), 2);
        assert_eq!(list.find("sugar", Unit::Cup).unwrap().quantity, 1.0);
        assert_eq!(list.find("sugar", Unit::Tsp).unwrap().quantity, 2.0);
    }

    #[test]
    fn test_name_case_merges_and_keeps_first_casing() {
        let library = library(vec![
            recipe("Omelette", &[("Eggs", 3.0, Unit::Unit)]),
            recipe("Cake", &[("eggs", 2.0, Unit::Unit)]),
        ]);
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Sunday, MealType::Breakfast, "Omelette")
            .unwrap();
        plan.assign(Day::Saturday, MealType::Dinner, "Cake").unwrap();

        let list = compute_shopping_list(&plan, &library);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].name, "Eggs");
        assert_eq!(list.items()[0].quantity, 5.0);
    }

    #[test]
    fn test_dangling_reference_is_skipped() {
        let library = library(vec![recipe("Toast", &[("bread", 2.0, Unit::Unit)])]);
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Monday, MealType::Breakfast, "Toast").unwrap();
        plan.assign(Day::Monday, MealType::Lunch, "Deleted Recipe")
            .unwrap();

        let list = compute_shopping_list(&plan, &library);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].name, "bread");
    }

    #[test]
    fn test_sorted_by_name_ignoring_case() {
        let library = library(vec![recipe(
            "Stew",
            &[
                ("onion", 1.0, Unit::Unit),
                ("Beef", 2.0, Unit::Lb),
                ("carrot", 3.0, Unit::Unit),
                ("beef", 1.0, Unit::Oz),
            ],
        )]);
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Thursday, MealType::Dinner, "Stew").unwrap();

        let list = compute_shopping_list(&plan, &library);
        let lines: Vec<(String, Unit)> = list.iter().map(|i| (i.name.clone(), i.unit)).collect();
        assert_eq!(
            lines,
            [
                ("Beef".to_string(), Unit::Lb),
                ("beef".to_string(), Unit::Oz),
                ("carrot".to_string(), Unit::Unit),
                ("onion".to_string(), Unit::Unit),
            ]
        );
    }

    #[test]
    fn test_totals_do_not_depend_on_plan_layout() {
        let library = library(vec![
            recipe("A", &[("rice", 1.0, Unit::Cup), ("beans", 1.0, Unit::Pkg)]),
            recipe("B", &[("rice", 0.5, Unit::Cup)]),
            recipe("C", &[("beans", 2.0, Unit::Pkg)]),
        ]);
        let placements = [
            (Day::Sunday, MealType::Dinner, "A"),
            (Day::Monday, MealType::Lunch, "B"),
            (Day::Wednesday, MealType::Breakfast, "C"),
            (Day::Saturday, MealType::Dinner, "B"),
        ];

        let mut forward = WeeklyPlan::default();
        for (day, slot, name) in placements {
            forward.assign(day, slot, name).unwrap();
        }
        // Same recipes, different days and slots, reversed insertion.
        let mut shuffled = WeeklyPlan::default();
        for ((_, _, name), day) in placements.iter().rev().zip(Day::WEEK) {
            shuffled.assign(day, MealType::Lunch, *name).unwrap();
        }

        let a = compute_shopping_list(&forward, &library);
        let b = compute_shopping_list(&shuffled, &library);
        assert_eq!(a, b);
        assert_eq!(a.find("rice", Unit::Cup).unwrap().quantity, 2.0);
        assert_eq!(a.find("beans", Unit::Pkg).unwrap().quantity, 3.0);
    }

    #[test]
    fn test_empty_plan_gives_empty_list() {
        let library = library(vec![recipe("A", &[("rice", 1.0, Unit::Cup)])]);
        assert!(compute_shopping_list(&WeeklyPlan::default(), &library).is_empty());
    }
}
