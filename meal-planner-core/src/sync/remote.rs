//! The remote document and the store it lives in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RemoteError;
use crate::library::RecipeLibrary;
use crate::plan::WeeklyPlan;

/// The whole persisted state, stored remotely as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub meal_plan: WeeklyPlan,
    pub meal_library: RecipeLibrary,
}

impl RemoteDocument {
    pub fn new(meal_plan: WeeklyPlan, meal_library: RecipeLibrary) -> Self {
        Self {
            meal_plan,
            meal_library,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RemoteError> {
        serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RemoteError> {
        serde_json::to_string_pretty(self).map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

/// A single addressable document store.
///
/// Writes replace the whole document; there are no deltas and no conflict
/// detection, so the last writer wins.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Cheap connectivity and credential check.
    async fn probe(&self) -> Result<(), RemoteError>;

    /// Reads the document. `Ok(None)` means the store exists but holds no document yet.
    async fn fetch(&self) -> Result<Option<RemoteDocument>, RemoteError>;

    /// Replaces the stored document.
    async fn replace(&self, document: &RemoteDocument) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, MealType};

    #[test]
    fn test_document_uses_stored_key_names() {
        let mut plan = WeeklyPlan::default();
        plan.assign(Day::Monday, MealType::Dinner, "Chili").unwrap();
        let doc = RemoteDocument::new(plan, RecipeLibrary::new());

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["mealPlan"]["Monday"]["dinner"][0], "Chili");
        assert!(json["mealLibrary"].is_array());
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let err = RemoteDocument::from_json(r#"{"mealPlan": []}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Parse(_)));
    }
}
