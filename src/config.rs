//! Settings and platform-specific paths
//!
//! Settings are layered, highest priority first:
//! 1. Environment variables (`EATING_HELPER__USDA__API_KEY`, ...) and the
//!    legacy `USDA_API_KEY`
//! 2. The config file (`--config`, else `<config dir>/eating-helper/config.toml`)
//! 3. Built-in defaults
//!
//! Relative paths in the config file are resolved against the directory the
//! file lives in.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveTime};
use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::google::{MealTimes, TaskListRef};
use crate::usda::client::DEFAULT_BASE_URL;

pub const APP_NAME: &str = "eating-helper";

const ENV_PREFIX: &str = "EATING_HELPER";

/// Get the directory holding the default config file
/// - macOS: ~/Library/Application Support/eating-helper/
/// - Linux: ~/.config/eating-helper/
/// - Windows: %APPDATA%/eating-helper/
pub fn config_dir() -> Result<PathBuf> {
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join(APP_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub usda: UsdaSettings,
    #[serde(default)]
    pub google: GoogleSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_recipes")]
    pub recipes: PathBuf,
    #[serde(default = "default_meal_plan")]
    pub meal_plan: PathBuf,
    /// Food group tables; the bundled tables are used when unset
    #[serde(default)]
    pub food_groups: Option<PathBuf>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            recipes: default_recipes(),
            meal_plan: default_meal_plan(),
            food_groups: None,
        }
    }
}

fn default_recipes() -> PathBuf {
    PathBuf::from("recipes.yaml")
}

fn default_meal_plan() -> PathBuf {
    PathBuf::from("meal_plan.yaml")
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsdaSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_usda_base_url")]
    pub base_url: String,
    /// SQLite file for caching food records between runs
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl Default for UsdaSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_usda_base_url(),
            cache_path: None,
        }
    }
}

fn default_usda_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    #[serde(default)]
    pub shopping_list_id: Option<String>,
    #[serde(default)]
    pub shopping_list_name: Option<String>,
    #[serde(default = "default_meal_plan_calendar")]
    pub meal_plan_calendar: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
            shopping_list_id: None,
            shopping_list_name: None,
            meal_plan_calendar: default_meal_plan_calendar(),
        }
    }
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_meal_plan_calendar() -> String {
    "Meal Plan".to_string()
}

impl GoogleSettings {
    /// The shopping list, by id if one is set, else by name
    pub fn shopping_list(&self) -> Result<TaskListRef> {
        match (&self.shopping_list_id, &self.shopping_list_name) {
            (Some(id), _) => Ok(TaskListRef::Id(id.clone())),
            (None, Some(name)) => Ok(TaskListRef::Title(name.clone())),
            (None, None) => bail!(
                "No shopping list configured: \
                 set google.shopping_list_id or google.shopping_list_name"
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    /// Local start of the first meal, "HH:MM"
    #[serde(default = "default_first_meal")]
    pub first_meal: String,
    #[serde(default = "default_meal_interval")]
    pub meal_interval_minutes: u32,
    #[serde(default = "default_meal_duration")]
    pub meal_duration_minutes: u32,
    #[serde(default = "default_reminder")]
    pub reminder_minutes: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            first_meal: default_first_meal(),
            meal_interval_minutes: default_meal_interval(),
            meal_duration_minutes: default_meal_duration(),
            reminder_minutes: default_reminder(),
        }
    }
}

fn default_first_meal() -> String {
    "09:00".to_string()
}

fn default_meal_interval() -> u32 {
    180
}

fn default_meal_duration() -> u32 {
    60
}

fn default_reminder() -> u32 {
    5
}

impl ScheduleSettings {
    pub fn meal_times(&self) -> Result<MealTimes> {
        let first_meal = NaiveTime::parse_from_str(&self.first_meal, "%H:%M")
            .with_context(|| format!("Invalid schedule.first_meal: {}", self.first_meal))?;
        Ok(MealTimes {
            first_meal,
            interval: Duration::minutes(self.meal_interval_minutes.into()),
            duration: Duration::minutes(self.meal_duration_minutes.into()),
        })
    }
}

impl Settings {
    /// Load settings from `config_path`, or the default location if `None`
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, std::env::vars().collect())
    }

    fn load_with_env(config_path: Option<&Path>, env: Map<String, String>) -> Result<Self> {
        let path = match config_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => default_config_path().ok().filter(|p| p.exists()),
        };

        let mut builder = Config::builder();
        if let Some(path) = &path {
            tracing::debug!(path = %path.display(), "Loading config file");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        let legacy_key = env.get("USDA_API_KEY").cloned();
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        );
        if let Some(key) = legacy_key {
            builder = builder.set_override("usda.api_key", key)?;
        }

        let mut settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.base_dir = path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(settings)
    }

    /// Resolve a configured path: `~/` is the home directory, other relative
    /// paths are relative to the config file
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn recipes_path(&self) -> PathBuf {
        self.resolve(&self.data.recipes)
    }

    pub fn meal_plan_path(&self) -> PathBuf {
        self.resolve(&self.data.meal_plan)
    }

    pub fn food_groups_path(&self) -> Option<PathBuf> {
        self.data.food_groups.as_deref().map(|p| self.resolve(p))
    }

    pub fn usda_cache_path(&self) -> Option<PathBuf> {
        self.usda.cache_path.as_deref().map(|p| self.resolve(p))
    }

    pub fn google_token_path(&self) -> PathBuf {
        self.resolve(&self.google.token_path)
    }

    pub fn usda_api_key(&self) -> Result<&str> {
        self.usda
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .context("No USDA API key: set usda.api_key or USDA_API_KEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let settings = Settings::load_with_env(Some(&path), Map::new()).unwrap();

        assert_eq!(settings.usda.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.google.meal_plan_calendar, "Meal Plan");
        assert_eq!(settings.schedule.reminder_minutes, 5);
        assert_eq!(settings.recipes_path(), dir.path().join("recipes.yaml"));
        assert!(settings.food_groups_path().is_none());
        assert!(settings.usda_api_key().is_err());
    }

    #[test]
    fn test_file_values_and_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[data]
recipes = "data/recipes.yaml"
meal_plan = "/srv/meals/plan.yaml"

[usda]
api_key = "from-file"
cache_path = "cache/foods.sqlite"

[google]
shopping_list_name = "Groceries"

[schedule]
first_meal = "08:30"
meal_interval_minutes = 240
"#,
        );
        let settings = Settings::load_with_env(Some(&path), Map::new()).unwrap();

        assert_eq!(settings.recipes_path(), dir.path().join("data/recipes.yaml"));
        assert_eq!(settings.meal_plan_path(), PathBuf::from("/srv/meals/plan.yaml"));
        assert_eq!(
            settings.usda_cache_path(),
            Some(dir.path().join("cache/foods.sqlite"))
        );
        assert_eq!(settings.usda_api_key().unwrap(), "from-file");
        assert_eq!(
            settings.google.shopping_list().unwrap(),
            TaskListRef::Title("Groceries".to_string())
        );

        let times = settings.schedule.meal_times().unwrap();
        assert_eq!(times.first_meal, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(times.interval, Duration::hours(4));
        assert_eq!(times.duration, Duration::minutes(60));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[google]\nmeal_plan_calendar = \"Food\"\n");
        let env: Map<String, String> = [
            ("EATING_HELPER__GOOGLE__MEAL_PLAN_CALENDAR", "Meals"),
            ("USDA_API_KEY", "legacy-key"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings = Settings::load_with_env(Some(&path), env).unwrap();
        assert_eq!(settings.google.meal_plan_calendar, "Meals");
        assert_eq!(settings.usda_api_key().unwrap(), "legacy-key");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load_with_env(Some(&dir.path().join("nope.toml")), Map::new())
            .unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_shopping_list_id_wins_over_name() {
        let google = GoogleSettings {
            shopping_list_id: Some("MTIz".to_string()),
            shopping_list_name: Some("Groceries".to_string()),
            ..GoogleSettings::default()
        };
        assert_eq!(
            google.shopping_list().unwrap(),
            TaskListRef::Id("MTIz".to_string())
        );
        assert!(GoogleSettings::default().shopping_list().is_err());
    }

    #[test]
    fn test_invalid_first_meal() {
        let schedule = ScheduleSettings {
            first_meal: "breakfast".to_string(),
            ..ScheduleSettings::default()
        };
        assert!(schedule.meal_times().is_err());
    }

    #[test]
    fn test_config_dir() {
        // Should not panic
        let _ = config_dir();
    }
}
