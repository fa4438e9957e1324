//! The weekly plan: day -> meal slot -> recipe names.
//!
//! References are weak. A name may outlive its recipe for a while (for
//! example while remote state is being adopted), so readers must skip names
//! they cannot resolve.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PlannerError;
use crate::models::{Day, MealType};

type Slots = BTreeMap<MealType, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyPlan {
    days: BTreeMap<Day, Slots>,
}

impl WeeklyPlan {
    /// An empty plan with every day and slot present.
    pub fn skeleton(include_snacks: bool) -> Self {
        let days = Day::all(include_snacks)
            .into_iter()
            .map(|day| {
                let slots = day.slots().iter().map(|s| (*s, Vec::new())).collect();
                (day, slots)
            })
            .collect();
        Self { days }
    }

    /// Rebuilds a loaded plan on top of the skeleton.
    ///
    /// Missing days and slots are filled with empty lists, slots that do not
    /// belong to their day are dropped, and repeated names within a slot are
    /// collapsed. A stored Snacks day is kept even when snacks are disabled.
    pub fn normalized(mut self, include_snacks: bool) -> Self {
        let keep_snacks = include_snacks || self.days.contains_key(&Day::Snacks);
        let mut plan = Self::skeleton(keep_snacks);
        for (day, slots) in plan.days.iter_mut() {
            let Some(mut stored) = self.days.remove(day) else {
                continue;
            };
            for (slot, names) in slots.iter_mut() {
                for name in stored.remove(slot).unwrap_or_default() {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        plan
    }

    /// Days of this plan in display order.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    pub fn includes(&self, day: Day) -> bool {
        self.days.contains_key(&day)
    }

    /// Slots of `day` with their recipe names, in display order.
    pub fn slots(&self, day: Day) -> impl Iterator<Item = (MealType, &[String])> + '_ {
        self.days
            .get(&day)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(slot, names)| (*slot, names.as_slice())))
    }

    /// Recipe names planned for one slot. Unknown slots are empty.
    pub fn slot(&self, day: Day, slot: MealType) -> &[String] {
        self.days
            .get(&day)
            .and_then(|slots| slots.get(&slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends `recipe` to a slot.
    ///
    /// Assigning a name that is already in the slot is rejected and leaves the
    /// slot unchanged.
    pub fn assign(
        &mut self,
        day: Day,
        slot: MealType,
        recipe: impl Into<String>,
    ) -> Result<(), PlannerError> {
        let recipe = recipe.into();
        let names = self.slot_mut(day, slot)?;
        if names.contains(&recipe) {
            return Err(PlannerError::AlreadyPlanned { day, slot, recipe });
        }
        names.push(recipe);
        Ok(())
    }

    /// Removes every occurrence of `recipe` from a slot. Returns how many were removed.
    pub fn unassign(&mut self, day: Day, slot: MealType, recipe: &str) -> usize {
        match self.days.get_mut(&day).and_then(|slots| slots.get_mut(&slot)) {
            Some(names) => retain_count(names, |n| n.as_str() != recipe),
            None => 0,
        }
    }

    /// Empties every slot of `day`. Returns how many references were removed.
    pub fn clear_day(&mut self, day: Day) -> usize {
        let Some(slots) = self.days.get_mut(&day) else {
            return 0;
        };
        slots
            .values_mut()
            .map(|names| std::mem::take(names).len())
            .sum()
    }

    /// Removes `recipe` from every day and slot.
    pub fn cascade_remove(&mut self, recipe: &str) -> usize {
        self.days
            .values_mut()
            .flat_map(|slots| slots.values_mut())
            .map(|names| retain_count(names, |n| n.as_str() != recipe))
            .sum()
    }

    pub fn is_day_empty(&self, day: Day) -> bool {
        self.slots(day).all(|(_, names)| names.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.references().next().is_none()
    }

    /// Every planned reference as `(day, slot, name)`.
    pub fn references(&self) -> impl Iterator<Item = (Day, MealType, &str)> + '_ {
        self.days.iter().flat_map(|(day, slots)| {
            slots.iter().flat_map(move |(slot, names)| {
                names.iter().map(move |name| (*day, *slot, name.as_str()))
            })
        })
    }

    /// How many slots reference `recipe`.
    pub fn count_references(&self, recipe: &str) -> usize {
        self.references().filter(|(_, _, name)| *name == recipe).count()
    }

    fn slot_mut(&mut self, day: Day, slot: MealType) -> Result<&mut Vec<String>, PlannerError> {
        if !day.has_slot(slot) {
            return Err(PlannerError::InvalidSlot { day, slot });
        }
        let slots = self
            .days
            .get_mut(&day)
            .ok_or(PlannerError::UnknownDay(day))?;
        Ok(slots.entry(slot).or_default())
    }
}

impl Default for WeeklyPlan {
    fn default() -> Self {
        Self::skeleton(false)
    }
}

fn retain_count(names: &mut Vec<String>, keep: impl Fn(&String) -> bool) -> usize {
    let before = names.len();
    names.retain(|n| keep(n));
    before - names.len()
}
