//! Opens the planner for one CLI invocation.

use meal_planner_core::{GistStore, LocalStore, MealPlanner, SyncCoordinator};

use crate::config::{Config, SyncConfig};

pub type Planner = MealPlanner<GistStore>;

/// Runs the startup sequence against the configured data directory and gist.
pub async fn open(config: &Config) -> Planner {
    let local = LocalStore::new(config.data_dir.value.clone());
    tracing::debug!("Using data directory {}", local.data_dir().display());
    let sync = SyncCoordinator::new(gist_store(&config.sync), config.sync.debounce_window());
    MealPlanner::start(local, sync, config.include_snacks.value).await
}

/// Builds the gist client, or `None` when credentials are missing.
pub fn gist_store(sync: &SyncConfig) -> Option<GistStore> {
    match (&sync.gist_id, &sync.token) {
        (Some(gist_id), Some(token)) => Some(
            GistStore::new(gist_id, token)
                .with_api_url(sync.api_url())
                .with_file_name(sync.file_name()),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gist_store_needs_credentials() {
        let mut sync = SyncConfig {
            gist_id: Some("abc123".into()),
            ..Default::default()
        };
        assert!(gist_store(&sync).is_none());

        sync.token = Some("secret".into());
        let store = gist_store(&sync).unwrap();
        assert_eq!(store.gist_id(), "abc123");
        assert_eq!(store.file_name(), "meal-planner.json");
    }

    #[tokio::test]
    async fn test_open_without_sync_uses_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\ninclude_snacks: true\n").unwrap();
        let config = Config::load(Some(config_path)).unwrap();

        let planner = open(&config).await;
        assert_eq!(planner.local().data_dir(), temp_dir.path().join("data"));
        assert!(planner.include_snacks());
        assert!(!planner.sync().is_configured());
    }
}
