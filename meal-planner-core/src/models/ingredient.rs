use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement units offered by the recipe form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Tsp,
    Tbsp,
    Cup,
    Oz,
    Lb,
    Pkg,
    Unit,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Tsp,
        Unit::Tbsp,
        Unit::Cup,
        Unit::Oz,
        Unit::Lb,
        Unit::Pkg,
        Unit::Unit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Tsp => "tsp",
            Unit::Tbsp => "tbsp",
            Unit::Cup => "cup",
            Unit::Oz => "oz",
            Unit::Lb => "lb",
            Unit::Pkg => "pkg",
            Unit::Unit => "unit",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(input))
            .ok_or_else(|| {
                format!(
                    "Invalid unit '{}'. Valid options: tsp, tbsp, cup, oz, lb, pkg, unit",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.unit, self.name)
    }
}
