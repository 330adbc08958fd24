use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::TemperatureUnit;

/// Environment variable consulted before the config file for the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Locations offered by the interactive prompt when the user has not saved
/// any of their own.
const DEFAULT_LOCATIONS: &[&str] = &[
    "London,GB",
    "New York,US",
    "Delhi,DL,IN",
    "Mumbai,MH,IN",
    "Kolkata,WB,IN",
    "Tokyo,JP",
];

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API credential. `OPENWEATHER_API_KEY` in the
    /// environment takes precedence over this field.
    pub api_key: Option<String>,

    /// Unit used when the CLI is not told otherwise.
    #[serde(default)]
    pub default_unit: TemperatureUnit,

    /// Locations offered by the interactive prompt.
    #[serde(default)]
    pub saved_locations: Vec<String>,
}

impl Config {
    /// Resolve the API credential: environment first, then the config
    /// file. A missing credential is a startup-time configuration error,
    /// never a per-request failure.
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }

    /// Locations to offer in the interactive prompt, falling back to a
    /// built-in list when none are saved.
    pub fn prompt_locations(&self) -> Vec<String> {
        if self.saved_locations.is_empty() {
            DEFAULT_LOCATIONS.iter().map(ToString::to_string).collect()
        } else {
            self.saved_locations.clone()
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn resolve_api_key(env_key: Option<String>, file_key: Option<&str>) -> Result<String> {
    if let Some(key) = env_key {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    file_key.map(str::to_owned).ok_or_else(|| {
        anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: set {API_KEY_ENV} or run `weatherdash configure` and enter your key."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_nothing_is_configured() {
        let err = resolve_api_key(None, None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: set OPENWEATHER_API_KEY"));
    }

    #[test]
    fn api_key_comes_from_the_config_file() {
        let key = resolve_api_key(None, Some("FILE_KEY")).unwrap();
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn environment_key_takes_precedence() {
        let key = resolve_api_key(Some("ENV_KEY".to_string()), Some("FILE_KEY")).unwrap();
        assert_eq!(key, "ENV_KEY");
    }

    #[test]
    fn blank_environment_key_is_ignored() {
        let key = resolve_api_key(Some("   ".to_string()), Some("FILE_KEY")).unwrap();
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn prompt_locations_fall_back_to_builtin_list() {
        let cfg = Config::default();
        let locations = cfg.prompt_locations();

        assert!(!locations.is_empty());
        assert!(locations.iter().any(|l| l == "London,GB"));
    }

    #[test]
    fn prompt_locations_prefer_saved_ones() {
        let cfg = Config {
            saved_locations: vec!["Bhubaneswar,OD,IN".to_string()],
            ..Config::default()
        };

        assert_eq!(cfg.prompt_locations(), vec!["Bhubaneswar,OD,IN"]);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            api_key: Some("KEY".to_string()),
            default_unit: TemperatureUnit::Fahrenheit,
            saved_locations: vec!["London,GB".to_string()],
        };

        let serialized = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&serialized).expect("parses");

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        assert_eq!(parsed.default_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(parsed.saved_locations, vec!["London,GB"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Config = toml::from_str("").expect("parses");

        assert!(parsed.api_key.is_none());
        assert_eq!(parsed.default_unit, TemperatureUnit::Celsius);
        assert!(parsed.saved_locations.is_empty());
    }
}
