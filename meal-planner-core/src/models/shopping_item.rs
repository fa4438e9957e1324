//! Shopping list items derived from the weekly plan.
//!
//! Items are never stored; they are recomputed from the plan and the recipe
//! library whenever either changes.

use rand::seq::IndexedRandom;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::Unit;

/// Placeholder lines shown instead of an empty shopping list.
pub const EMPTY_LIST_MESSAGES: [&str; 12] = [
    "Empty list? Let's map out your week of deliciousness!",
    "Your menu's a blank canvas - time to paint it with tasty meals!",
    "Make Future You happy - plan your week of yummy eats now!",
    "A week of great meals starts with a plan. Let's get cooking!",
    "Your stomach called from Friday - it wants to know what's for dinner!",
    "Planning meals today means no 'what's for dinner?' headaches tomorrow!",
    "Ready to turn 'what should we eat?' into 'what shall we eat first?'",
    "Skip the weeknight scramble - let's plan your menu masterpiece!",
    "Turn hangry into happy - plan your week of meals!",
    "Future You will thank Present You for planning this week's feasts!",
    "Meal planning mode: activated! Your taste buds are standing by...",
    "Think of this as your week's food story - let's write a tasty one!",
];

/// Picks one of [`EMPTY_LIST_MESSAGES`] uniformly at random.
pub fn random_empty_message() -> &'static str {
    EMPTY_LIST_MESSAGES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(EMPTY_LIST_MESSAGES[0])
}

/// One line of the shopping list: an ingredient summed across planned recipes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShoppingItem {
    /// Display name, cased as first seen
    pub name: String,
    pub unit: Unit,
    /// Raw sum of every contribution
    pub quantity: f64,
    /// Recipes that need this ingredient
    pub source_recipes: BTreeSet<String>,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.source_recipes.iter().map(String::as_str).collect();
        write!(
            f,
            "{} {} {} ({})",
            self.quantity,
            self.unit,
            self.name,
            sources.join(" | ")
        )
    }
}

/// The ordered shopping list.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ShoppingList {
    items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn new(items: Vec<ShoppingItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShoppingItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds an item by ingredient name and unit, ignoring case.
    pub fn find(&self, name: &str, unit: Unit) -> Option<&ShoppingItem> {
        self.items
            .iter()
            .find(|item| item.unit == unit && item.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a ShoppingList {
    type Item = &'a ShoppingItem;
    type IntoIter = std::slice::Iter<'a, ShoppingItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "{}", random_empty_message());
        }
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour(quantity: f64, sources: &[&str]) -> ShoppingItem {
        ShoppingItem {
            name: "Flour".into(),
            unit: Unit::Cup,
            quantity,
            source_recipes: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_random_empty_message_is_from_fixed_set() {
        for _ in 0..50 {
            let message = random_empty_message();
            assert!(!message.is_empty());
            assert!(EMPTY_LIST_MESSAGES.contains(&message));
        }
    }

    #[test]
    fn test_shopping_item_display() {
        let item = flour(3.0, &["Pancakes", "Bread"]);
        assert_eq!(format!("{}", item), "3 cup Flour (Bread | Pancakes)");
    }

    #[test]
    fn test_shopping_item_display_keeps_raw_sum() {
        let item = flour(0.1 + 0.2, &["Cake"]);
        assert_eq!(format!("{}", item), "0.30000000000000004 cup Flour (Cake)");
    }

    #[test]
    fn test_empty_list_display_shows_placeholder() {
        let output = format!("{}", ShoppingList::default());
        let line = output.trim_end();
        assert!(EMPTY_LIST_MESSAGES.contains(&line));
    }

    #[test]
    fn test_find_ignores_case() {
        let list = ShoppingList::new(vec![flour(1.0, &["Cake"])]);
        assert!(list.find("flour", Unit::Cup).is_some());
        assert!(list.find("flour", Unit::Lb).is_none());
    }
}
