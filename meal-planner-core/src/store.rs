//! Local persistence for the plan and the recipe library.
//!
//! A small key-value store over a data directory. Each key is a JSON file:
//!
//! ```text
//! <data_dir>/
//! ├── mealPlan.json       # WeeklyPlan
//! └── mealLibrary.json    # RecipeLibrary (array of recipes)
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::library::RecipeLibrary;
use crate::plan::WeeklyPlan;

/// The logical keys of the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    MealPlan,
    MealLibrary,
}

impl StoreKey {
    pub fn key(&self) -> &'static str {
        match self {
            StoreKey::MealPlan => "mealPlan",
            StoreKey::MealLibrary => "mealLibrary",
        }
    }

    /// Returns the filename for this key.
    pub fn filename(&self) -> String {
        format!("{}.json", self.key())
    }
}

/// Errors reading or writing the local store.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// Stored JSON could not be parsed.
    Parse(PathBuf, serde_json::Error),
    /// Value could not be serialized.
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::Parse(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            StorageError::Serialize(e) => write!(f, "Failed to serialize: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::Parse(_, e) | StorageError::Serialize(e) => Some(e),
        }
    }
}

/// Directory-backed store for `mealPlan` and `mealLibrary`.
#[derive(Clone, Debug)]
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(key.filename())
    }

    pub fn exists(&self, key: StoreKey) -> bool {
        self.path(key).exists()
    }

    /// Loads the stored plan, normalized to the day layout.
    ///
    /// Returns `Ok(None)` if nothing is stored yet.
    pub fn load_plan(&self, include_snacks: bool) -> Result<Option<WeeklyPlan>, StorageError> {
        Ok(self
            .load::<WeeklyPlan>(StoreKey::MealPlan)?
            .map(|plan| plan.normalized(include_snacks)))
    }

    /// Loads the stored library, dropping entries that fail validation.
    pub fn load_library(&self) -> Result<Option<RecipeLibrary>, StorageError> {
        Ok(self
            .load::<RecipeLibrary>(StoreKey::MealLibrary)?
            .map(|library| library.revalidated().0))
    }

    pub fn save_plan(&self, plan: &WeeklyPlan) -> Result<(), StorageError> {
        self.save(StoreKey::MealPlan, plan)
    }

    pub fn save_library(&self, library: &RecipeLibrary) -> Result<(), StorageError> {
        self.save(StoreKey::MealLibrary, library)
    }

    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StorageError> {
        let path = self.path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(|e| StorageError::Parse(path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    /// Writes one key, creating the data directory if needed.
    fn save<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let path = self.path(key);
        let json = serde_json::to_string(value).map_err(StorageError::Serialize)?;
        fs::write(&path, json).map_err(|e| StorageError::IoError(path, e))?;

        tracing::debug!("Saved {} to {}", key.key(), self.data_dir.display());
        Ok(())
    }
}
