//! The application context.
//!
//! `MealPlanner` owns the library, the plan, the cached shopping list and the
//! sync coordinator. UIs drive it with typed [`Command`]s.

use crate::aggregate::compute_shopping_list;
use crate::error::PlannerError;
use crate::import::{export_library, import_recipes, ImportReport};
use crate::library::RecipeLibrary;
use crate::models::{Day, MealType, Recipe, ShoppingList};
use crate::plan::WeeklyPlan;
use crate::store::{LocalStore, StorageError};
use crate::sync::{RemoteDocument, RemoteError, RemoteStore, SyncCoordinator, SyncNotice};

/// A user intent.
#[derive(Debug, Clone)]
pub enum Command {
    AddRecipe(Recipe),
    /// Replaces the recipe called `name`. A changed name drops plan references to the old one.
    UpdateRecipe { name: String, recipe: Recipe },
    RemoveRecipe(String),
    Assign {
        day: Day,
        slot: MealType,
        recipe: String,
    },
    Unassign {
        day: Day,
        slot: MealType,
        recipe: String,
    },
    ClearDay(Day),
    /// Merges a JSON array of recipes into the library.
    ImportRecipes(String),
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    RecipeAdded(String),
    RecipeUpdated {
        name: String,
        /// Plan entries dropped because the recipe was renamed.
        references_removed: usize,
    },
    RecipeRemoved {
        name: String,
        references_removed: usize,
    },
    Assigned,
    Unassigned(usize),
    DayCleared(usize),
    Imported(ImportReport),
    /// The command matched nothing; no state was touched.
    Unchanged,
}

pub struct MealPlanner<S: RemoteStore> {
    library: RecipeLibrary,
    plan: WeeklyPlan,
    shopping: ShoppingList,
    local: LocalStore,
    sync: SyncCoordinator<S>,
    include_snacks: bool,
}

impl<S: RemoteStore> MealPlanner<S> {
    /// Runs the startup sequence.
    ///
    /// Probes the remote store if configured and pulls the remote document.
    /// A pulled document becomes the session state and is written through to
    /// local storage. Otherwise local storage is loaded, and anything missing
    /// or unreadable there starts out empty.
    pub async fn start(local: LocalStore, mut sync: SyncCoordinator<S>, include_snacks: bool) -> Self {
        sync.connect().await;

        let (library, plan) = match sync.pull().await {
            Some(document) => {
                let (library, plan) = adopt(document, include_snacks);
                if let Err(e) = local
                    .save_library(&library)
                    .and_then(|()| local.save_plan(&plan))
                {
                    tracing::warn!("Failed to write remote state to local storage: {}", e);
                }
                (library, plan)
            }
            None => (
                load_or_default(local.load_library(), RecipeLibrary::new),
                load_or_default(local.load_plan(include_snacks), || {
                    WeeklyPlan::skeleton(include_snacks)
                }),
            ),
        };

        let shopping = compute_shopping_list(&plan, &library);
        Self {
            library,
            plan,
            shopping,
            local,
            sync,
            include_snacks,
        }
    }

    pub fn library(&self) -> &RecipeLibrary {
        &self.library
    }

    pub fn plan(&self) -> &WeeklyPlan {
        &self.plan
    }

    pub fn shopping_list(&self) -> &ShoppingList {
        &self.shopping
    }

    pub fn sync(&self) -> &SyncCoordinator<S> {
        &self.sync
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn include_snacks(&self) -> bool {
        self.include_snacks
    }

    /// Applies a command.
    ///
    /// On success the changed state is saved locally, the shopping list is
    /// recomputed and a debounced push is scheduled, in that order. On error
    /// nothing has changed.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, PlannerError> {
        let mut library = self.library.clone();
        let mut plan = self.plan.clone();
        let outcome = execute(&mut library, &mut plan, command)?;

        let library_changed = library != self.library;
        let plan_changed = plan != self.plan;
        if !library_changed && !plan_changed {
            return Ok(outcome);
        }

        self.persist(
            library_changed.then_some(&library),
            plan_changed.then_some(&plan),
        )?;

        self.library = library;
        self.plan = plan;
        self.shopping = compute_shopping_list(&self.plan, &self.library);
        self.sync.push(self.document());
        Ok(outcome)
    }

    /// The current state as a remote document.
    pub fn document(&self) -> RemoteDocument {
        RemoteDocument::new(self.plan.clone(), self.library.clone())
    }

    pub fn export_library(&self) -> Result<String, PlannerError> {
        export_library(&self.library)
    }

    /// Writes the current state to the remote store now, bypassing the debounce window.
    pub async fn push_now(&self) -> Result<(), RemoteError> {
        self.sync.push_now(self.document()).await
    }

    /// Re-reads the remote document and adopts it, as at startup.
    ///
    /// Returns whether a document was adopted.
    pub async fn pull_now(&mut self) -> Result<bool, PlannerError> {
        let Some(document) = self.sync.pull().await else {
            return Ok(false);
        };
        let (library, plan) = adopt(document, self.include_snacks);
        self.persist(Some(&library), Some(&plan))?;
        self.library = library;
        self.plan = plan;
        self.shopping = compute_shopping_list(&self.plan, &self.library);
        Ok(true)
    }

    /// Saves the given parts locally as one unit.
    ///
    /// If the plan cannot be written after the library was, the previously
    /// stored library is written back so storage never mixes old and new state.
    fn persist(
        &self,
        library: Option<&RecipeLibrary>,
        plan: Option<&WeeklyPlan>,
    ) -> Result<(), StorageError> {
        if let Some(library) = library {
            self.local.save_library(library)?;
        }
        if let Some(plan) = plan {
            if let Err(e) = self.local.save_plan(plan) {
                if library.is_some() {
                    if let Err(restore) = self.local.save_library(&self.library) {
                        tracing::error!("Failed to restore stored library: {}", restore);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Waits for any scheduled push to finish.
    pub async fn settle(&self) {
        self.sync.settle().await;
    }

    pub fn drain_notices(&self) -> Vec<SyncNotice> {
        self.sync.drain_notices()
    }
}

/// Turns a pulled document into session state, re-checking every recipe.
fn adopt(document: RemoteDocument, include_snacks: bool) -> (RecipeLibrary, WeeklyPlan) {
    let (library, skipped) = document.meal_library.revalidated();
    if skipped > 0 {
        tracing::warn!("Dropped {} invalid recipe(s) from the remote document", skipped);
    }
    (library, document.meal_plan.normalized(include_snacks))
}

fn load_or_default<T, E: std::fmt::Display>(
    loaded: Result<Option<T>, E>,
    default: impl FnOnce() -> T,
) -> T {
    match loaded {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable local data: {}", e);
            default()
        }
    }
}

fn execute(
    library: &mut RecipeLibrary,
    plan: &mut WeeklyPlan,
    command: Command,
) -> Result<Outcome, PlannerError> {
    match command {
        Command::AddRecipe(recipe) => {
            let name = recipe.name.clone();
            library.add(recipe)?;
            Ok(Outcome::RecipeAdded(name))
        }
        Command::UpdateRecipe { name, recipe } => {
            let new_name = recipe.name.clone();
            if library.update(&name, recipe)?.is_none() {
                return Ok(Outcome::Unchanged);
            }
            let references_removed = if new_name != name {
                plan.cascade_remove(&name)
            } else {
                0
            };
            Ok(Outcome::RecipeUpdated {
                name: new_name,
                references_removed,
            })
        }
        Command::RemoveRecipe(name) => match library.remove(&name) {
            Some(name) => {
                let references_removed = plan.cascade_remove(&name);
                Ok(Outcome::RecipeRemoved {
                    name,
                    references_removed,
                })
            }
            None => Ok(Outcome::Unchanged),
        },
        Command::Assign { day, slot, recipe } => {
            if library.find_by_name(&recipe).is_none() {
                return Err(PlannerError::UnknownRecipe(recipe));
            }
            plan.assign(day, slot, recipe)?;
            Ok(Outcome::Assigned)
        }
        Command::Unassign { day, slot, recipe } => match plan.unassign(day, slot, &recipe) {
            0 => Ok(Outcome::Unchanged),
            n => Ok(Outcome::Unassigned(n)),
        },
        Command::ClearDay(day) => match plan.clear_day(day) {
            0 => Ok(Outcome::Unchanged),
            n => Ok(Outcome::DayCleared(n)),
        },
        Command::ImportRecipes(json) => Ok(Outcome::Imported(import_recipes(library, &json)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Unit};
    use crate::store::StoreKey;
    use crate::sync::MemoryStore;
    use tempfile::TempDir;

    fn recipe(name: &str, flour: f64) -> Recipe {
        Recipe::new(name)
            .with_categories([MealType::Breakfast, MealType::Lunch, MealType::Dinner])
            .with_ingredients(vec![Ingredient::new("flour", flour, Unit::Cup)])
    }

    async fn planner(dir: &TempDir) -> MealPlanner<MemoryStore> {
        MealPlanner::start(
            LocalStore::new(dir.path()),
            SyncCoordinator::unconfigured(),
            false,
        )
        .await
    }

    fn assign(day: Day, slot: MealType, recipe: &str) -> Command {
        Command::Assign {
            day,
            slot,
            recipe: recipe.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_with_nothing_stored() {
        let dir = TempDir::new().unwrap();
        let planner = planner(&dir).await;

        assert!(planner.library().is_empty());
        assert_eq!(planner.plan(), &WeeklyPlan::skeleton(false));
        assert!(planner.shopping_list().is_empty());
    }

    #[tokio::test]
    async fn test_start_ignores_corrupt_local_data() {
        let dir = TempDir::new().unwrap();
        let local = LocalStore::new(dir.path());
        std::fs::write(local.path(StoreKey::MealLibrary), "not json").unwrap();

        let planner = MealPlanner::<MemoryStore>::start(local, SyncCoordinator::unconfigured(), false).await;
        assert!(planner.library().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_persist_and_recompute() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;

        planner.apply(Command::AddRecipe(recipe("A", 2.0))).unwrap();
        planner.apply(Command::AddRecipe(recipe("B", 1.0))).unwrap();
        planner.apply(assign(Day::Sunday, MealType::Breakfast, "A")).unwrap();
        planner.apply(assign(Day::Monday, MealType::Lunch, "B")).unwrap();

        let item = planner.shopping_list().find("flour", Unit::Cup).unwrap();
        assert_eq!(item.quantity, 3.0);

        let local = LocalStore::new(dir.path());
        assert_eq!(local.load_library().unwrap().unwrap(), *planner.library());
        assert_eq!(local.load_plan(false).unwrap().unwrap(), *planner.plan());
    }

    #[tokio::test]
    async fn test_failed_command_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("A", 2.0))).unwrap();
        planner.apply(assign(Day::Friday, MealType::Dinner, "A")).unwrap();

        let err = planner
            .apply(assign(Day::Friday, MealType::Dinner, "A"))
            .unwrap_err();
        assert!(matches!(err, PlannerError::AlreadyPlanned { .. }));
        assert_eq!(planner.plan().slot(Day::Friday, MealType::Dinner), ["A"]);

        let err = planner
            .apply(Command::AddRecipe(recipe("a", 1.0)))
            .unwrap_err();
        assert!(matches!(err, PlannerError::DuplicateName(_)));
        assert_eq!(planner.library().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_requires_existing_recipe() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("Chili", 1.0))).unwrap();

        let err = planner
            .apply(assign(Day::Monday, MealType::Dinner, "chili"))
            .unwrap_err();
        assert!(matches!(err, PlannerError::UnknownRecipe(name) if name == "chili"));
    }

    #[tokio::test]
    async fn test_remove_cascades_to_plan() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("A", 2.0))).unwrap();
        planner.apply(assign(Day::Monday, MealType::Lunch, "A")).unwrap();
        planner.apply(assign(Day::Tuesday, MealType::Lunch, "A")).unwrap();

        let outcome = planner.apply(Command::RemoveRecipe("A".into())).unwrap();
        assert_eq!(
            outcome,
            Outcome::RecipeRemoved {
                name: "A".into(),
                references_removed: 2
            }
        );
        assert!(planner.plan().is_empty());
        assert!(planner.shopping_list().is_empty());
    }

    #[tokio::test]
    async fn test_rename_drops_old_references() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("Pancakes", 2.0))).unwrap();
        planner.apply(assign(Day::Sunday, MealType::Breakfast, "Pancakes")).unwrap();

        let outcome = planner
            .apply(Command::UpdateRecipe {
                name: "Pancakes".into(),
                recipe: recipe("Waffles", 2.0),
            })
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::RecipeUpdated {
                name: "Waffles".into(),
                references_removed: 1
            }
        );
        assert!(planner.library().find_by_name("Pancakes").is_none());
        assert_eq!(planner.plan().count_references("Pancakes"), 0);
    }

    #[tokio::test]
    async fn test_update_in_place_keeps_references() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("A", 2.0))).unwrap();
        planner.apply(assign(Day::Sunday, MealType::Dinner, "A")).unwrap();

        planner
            .apply(Command::UpdateRecipe {
                name: "A".into(),
                recipe: recipe("A", 5.0),
            })
            .unwrap();
        assert_eq!(planner.shopping_list().find("flour", Unit::Cup).unwrap().quantity, 5.0);
    }

    #[tokio::test]
    async fn test_commands_that_match_nothing() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;

        assert_eq!(
            planner.apply(Command::RemoveRecipe("Ghost".into())).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(
            planner
                .apply(Command::UpdateRecipe {
                    name: "Ghost".into(),
                    recipe: recipe("Ghost", 1.0)
                })
                .unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(planner.apply(Command::ClearDay(Day::Monday)).unwrap(), Outcome::Unchanged);
        assert!(!LocalStore::new(dir.path()).exists(StoreKey::MealLibrary));
    }

    #[tokio::test]
    async fn test_import_command() {
        let dir = TempDir::new().unwrap();
        let mut planner = planner(&dir).await;
        planner.apply(Command::AddRecipe(recipe("A", 1.0))).unwrap();
        let json = planner.export_library().unwrap();

        let outcome = planner.apply(Command::ImportRecipes(json)).unwrap();
        assert_eq!(
            outcome,
            Outcome::Imported(ImportReport {
                added: 0,
                invalid: 0,
                duplicates: 1
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_pushes_after_local_save() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let mut planner = MealPlanner::start(
            LocalStore::new(dir.path()),
            SyncCoordinator::new(Some(store.clone()), std::time::Duration::from_secs(2)),
            false,
        )
        .await;

        planner.apply(Command::AddRecipe(recipe("A", 1.0))).unwrap();
        assert!(LocalStore::new(dir.path()).exists(StoreKey::MealLibrary));
        assert!(planner.sync().is_pending());

        planner.settle().await;
        assert_eq!(store.document(), Some(planner.document()));
    }

    fn remote(recipe_name: &str) -> RemoteDocument {
        let mut library = RecipeLibrary::new();
        library.add(recipe(recipe_name, 4.0)).unwrap();
        let mut plan = WeeklyPlan::skeleton(false);
        plan.assign(Day::Monday, MealType::Dinner, recipe_name).unwrap();
        RemoteDocument::new(plan, library)
    }

    #[tokio::test]
    async fn test_start_drops_invalid_remote_recipes() {
        let dir = TempDir::new().unwrap();
        let document = RemoteDocument::from_json(
            r#"{
                "mealPlan": {"Monday": {"dinner": ["Chili", "chili"]}},
                "mealLibrary": [
                    {"name": "Chili", "categories": ["dinner"],
                     "ingredients": [{"name": "beans", "quantity": -5, "unit": "pkg"}]},
                    {"name": "chili", "categories": [], "ingredients": []}
                ]
            }"#,
        )
        .unwrap();
        let store = MemoryStore::new().with_document(document);

        let planner = MealPlanner::start(
            LocalStore::new(dir.path()),
            SyncCoordinator::new(Some(store), std::time::Duration::from_secs(2)),
            false,
        )
        .await;

        assert!(planner.library().is_empty());
        assert!(planner.shopping_list().is_empty());
        let stored = LocalStore::new(dir.path()).load_library().unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_apply_outside_runtime_pushes_on_startup_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let sync = SyncCoordinator::new(Some(store.clone()), std::time::Duration::from_millis(5));

        let mut planner =
            runtime.block_on(MealPlanner::start(LocalStore::new(dir.path()), sync, false));
        planner.apply(Command::AddRecipe(recipe("A", 1.0))).unwrap();
        runtime.block_on(planner.settle());

        assert_eq!(store.writes(), vec![planner.document()]);
        assert!(planner.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_pull_now_adopts_remote_state() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let mut planner = MealPlanner::start(
            LocalStore::new(dir.path()),
            SyncCoordinator::new(Some(store.clone()), std::time::Duration::from_secs(2)),
            false,
        )
        .await;
        assert!(planner.library().is_empty());

        let _ = store.clone().with_document(remote("Stew"));
        assert!(planner.pull_now().await.unwrap());

        assert!(planner.library().find_by_name("Stew").is_some());
        assert_eq!(planner.shopping_list().find("flour", Unit::Cup).unwrap().quantity, 4.0);
        let local = LocalStore::new(dir.path());
        assert_eq!(local.load_library().unwrap().unwrap(), *planner.library());
        assert_eq!(local.load_plan(false).unwrap().unwrap(), *planner.plan());
    }

    #[tokio::test]
    async fn test_pull_now_storage_failure_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let local = LocalStore::new(dir.path());
        let mut seeded = RecipeLibrary::new();
        seeded.add(recipe("Local", 1.0)).unwrap();
        local.save_library(&seeded).unwrap();
        std::fs::create_dir(local.path(StoreKey::MealPlan)).unwrap();

        let store = MemoryStore::new();
        let mut planner = MealPlanner::start(
            local,
            SyncCoordinator::new(Some(store.clone()), std::time::Duration::from_secs(2)),
            false,
        )
        .await;
        assert_eq!(planner.library(), &seeded);

        let _ = store.clone().with_document(remote("Stew"));
        let err = planner.pull_now().await.unwrap_err();

        assert!(matches!(err, PlannerError::Storage(_)));
        assert_eq!(planner.library(), &seeded);
        let stored = LocalStore::new(dir.path()).load_library().unwrap().unwrap();
        assert_eq!(stored, seeded);
    }
}
