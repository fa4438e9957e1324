use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::MealType;

/// A column of the weekly plan.
///
/// The seven weekdays carry breakfast, lunch and dinner slots. `Snacks` is a
/// pseudo-day with a single snack slot, present only when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Snacks,
}

impl Day {
    /// Sunday through Saturday.
    pub const WEEK: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Days of a plan, in display order.
    pub fn all(include_snacks: bool) -> Vec<Day> {
        let mut days = Self::WEEK.to_vec();
        if include_snacks {
            days.push(Day::Snacks);
        }
        days
    }

    /// The fixed slot set for this day.
    pub fn slots(&self) -> &'static [MealType] {
        match self {
            Day::Snacks => &[MealType::Snack],
            _ => &MealType::MEALS,
        }
    }

    pub fn has_slot(&self, slot: MealType) -> bool {
        self.slots().contains(&slot)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Sunday => "Sunday",
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Snacks => "Snacks",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        Day::all(true)
            .into_iter()
            .find(|day| {
                let name = day.as_str();
                name.eq_ignore_ascii_case(input) || name[..3].eq_ignore_ascii_case(input)
            })
            .ok_or_else(|| {
                format!(
                    "Invalid day '{}'. Valid options: Sunday..Saturday, Snacks",
                    s
                )
            })
    }
}
