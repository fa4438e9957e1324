//! Recipe library export and import.
//!
//! The exchange format is the stored library format: a JSON array of recipes.

use serde_json::Value;
use std::fmt;

use crate::error::PlannerError;
use crate::library::RecipeLibrary;
use crate::models::Recipe;

/// Suggested file name for an exported library.
pub const EXPORT_FILE_NAME: &str = "meal-library.json";

/// Counts from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Entries that were not well-formed recipes.
    pub invalid: usize,
    /// Entries whose name already existed, ignoring case.
    pub duplicates: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new recipes imported ({} duplicates skipped)",
            self.added, self.duplicates
        )?;
        if self.invalid > 0 {
            write!(f, ", {} invalid entries skipped", self.invalid)?;
        }
        Ok(())
    }
}

pub fn export_library(library: &RecipeLibrary) -> Result<String, PlannerError> {
    Ok(serde_json::to_string_pretty(library)?)
}

/// Merges the recipes in `json` into `library`.
///
/// The document must be a JSON array; anything else is rejected and the
/// library is left unchanged. Individual entries that fail to parse or
/// validate are skipped and counted, as are names already present.
pub fn import_recipes(library: &mut RecipeLibrary, json: &str) -> Result<ImportReport, PlannerError> {
    let entries: Value = serde_json::from_str(json)?;
    let Value::Array(entries) = entries else {
        return Err(PlannerError::Parse(
            "invalid recipe library format, expected an array".to_string(),
        ));
    };

    let mut report = ImportReport::default();
    for entry in entries {
        let recipe = match serde_json::from_value::<Recipe>(entry) {
            Ok(recipe) if recipe.validate().is_ok() => recipe,
            _ => {
                report.invalid += 1;
                continue;
            }
        };
        match library.add(recipe) {
            Ok(()) => report.added += 1,
            Err(PlannerError::DuplicateName(name)) => {
                tracing::debug!("Skipping duplicate recipe '{}'", name);
                report.duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        added = report.added,
        invalid = report.invalid,
        duplicates = report.duplicates,
        "Imported recipes"
    );
    Ok(report)
}
