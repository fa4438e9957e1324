use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use meal_planner_core::sync::{DEFAULT_API_URL, DEFAULT_FILE_NAME, DEFAULT_WINDOW};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Remote sync configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Id of the gist holding the shared document
    pub gist_id: Option<String>,
    /// Personal access token with gist scope
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// File inside the gist (default: meal-planner.json)
    pub file_name: Option<String>,
    /// API base URL (default: https://api.github.com)
    pub api_url: Option<String>,
    /// Quiet period before local edits are pushed, in milliseconds
    pub debounce_ms: Option<u64>,
}

impl SyncConfig {
    /// Returns true if sync is configured (has both gist_id and token)
    pub fn is_configured(&self) -> bool {
        self.gist_id.is_some() && self.token.is_some()
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WINDOW)
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding mealPlan.json and mealLibrary.json
    pub data_dir: ConfigValue<PathBuf>,
    /// Show the optional Snacks day in the plan
    pub include_snacks: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    include_snacks: Option<bool>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Builds the configuration. Environment variables override the config
    /// file, which overrides built-in defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self {
            data_dir: ConfigValue::new(Self::default_data_dir(), ConfigSource::Default),
            include_snacks: ConfigValue::new(false, ConfigSource::Default),
            config_file: None,
            sync: SyncConfig::default(),
        };

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            config.merge_file(path)?;
        }
        config.merge_env()?;
        Ok(config)
    }

    fn merge_file(&mut self, path: PathBuf) -> Result<(), ConfigError> {
        let contents =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError(path.clone(), e))?;
        let file: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

        if let Some(dir) = file.data_dir {
            self.data_dir = ConfigValue::new(relative_to(&path, dir), ConfigSource::File);
        }
        if let Some(snacks) = file.include_snacks {
            self.include_snacks = ConfigValue::new(snacks, ConfigSource::File);
        }
        if let Some(sync) = file.sync {
            self.sync = sync;
        }
        self.config_file = Some(path);
        Ok(())
    }

    fn merge_env(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = env_var("MEALPLAN_DATA_DIR") {
            self.data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(value) = env_var("MEALPLAN_INCLUDE_SNACKS") {
            let snacks = parse_flag(&value)
                .ok_or(ConfigError::InvalidEnv("MEALPLAN_INCLUDE_SNACKS", value))?;
            self.include_snacks = ConfigValue::new(snacks, ConfigSource::Environment);
        }
        if let Some(id) = env_var("MEALPLAN_GIST_ID") {
            self.sync.gist_id = Some(id);
        }
        if let Some(token) = env_var("MEALPLAN_GIST_TOKEN") {
            self.sync.token = Some(token);
        }
        Ok(())
    }

    /// `mealplan` under the user's config directory, or under `.` when the
    /// platform reports none.
    pub fn default_config_dir() -> PathBuf {
        app_dir(dirs::config_dir())
    }

    /// Where mealPlan.json and mealLibrary.json live unless configured:
    /// `mealplan` under the user's data directory.
    pub fn default_data_dir() -> PathBuf {
        app_dir(dirs::data_dir())
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("mealplan")
}

/// A relative `dir` in a config file is taken from the file's own directory.
fn relative_to(config_path: &Path, dir: PathBuf) -> PathBuf {
    match config_path.parent() {
        Some(parent) if dir.is_relative() => parent.join(dir),
        _ => dir,
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(var, value) => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("mealplan"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert!(!config.include_snacks.value);
        assert!(config.config_file.is_none());
        assert_eq!(config.sync.file_name(), "meal-planner.json");
        assert_eq!(config.sync.debounce_window(), Duration::from_millis(2000));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/meals").unwrap();
        writeln!(file, "include_snacks: true").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  gist_id: abc123").unwrap();
        writeln!(file, "  token: secret").unwrap();
        writeln!(file, "  debounce_ms: 500").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/meals"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert!(config.include_snacks.value);
        assert_eq!(config.include_snacks.source, ConfigSource::File);
        assert!(config.sync.is_configured());
        assert_eq!(config.sync.debounce_window(), Duration::from_millis(500));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync:\n  gist_id: abc\n  token: secret\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("abc"));
        assert!(!json.contains("secret"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "include_snacks: false\n").unwrap();

        std::env::set_var("MEALPLAN_INCLUDE_SNACKS", "yes");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.include_snacks.value);
        assert_eq!(config.include_snacks.source, ConfigSource::Environment);

        std::env::remove_var("MEALPLAN_INCLUDE_SNACKS");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_sync_needs_id_and_token() {
        let sync = SyncConfig {
            gist_id: Some("abc".into()),
            ..Default::default()
        };
        assert!(!sync.is_configured());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_relative_to_keeps_absolute_dirs() {
        let config_path = Path::new("/etc/mealplan/config.yaml");
        assert_eq!(
            relative_to(config_path, PathBuf::from("/srv/meals")),
            PathBuf::from("/srv/meals")
        );
        assert_eq!(
            relative_to(config_path, PathBuf::from("data")),
            PathBuf::from("/etc/mealplan/data")
        );
    }
}
