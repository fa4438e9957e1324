//! Error types for planner operations.

use thiserror::Error;

use crate::models::{Day, MealType};
use crate::store::StorageError;

/// Errors returned by library, plan and application operations.
///
/// Every variant is a rejection: the operation that produced it has not
/// mutated any state.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("A recipe named '{0}' already exists")]
    DuplicateName(String),

    #[error("'{recipe}' is already planned for {day} {slot}")]
    AlreadyPlanned {
        day: Day,
        slot: MealType,
        recipe: String,
    },

    #[error("Recipe not found: {0}")]
    UnknownRecipe(String),

    #[error("{day} has no {slot} slot")]
    InvalidSlot { day: Day, slot: MealType },

    #[error("{0} is not part of this plan")]
    UnknownDay(Day),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PlannerError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PlannerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(e: serde_json::Error) -> Self {
        PlannerError::Parse(e.to_string())
    }
}
