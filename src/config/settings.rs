//! User settings
//!
//! Preferences that fill in what the command line leaves out: which currency a
//! new budget uses, who the acting user is, and how chatty logging should be.

use serde::{Deserialize, Serialize};

use super::paths::HouseholdPaths;
use crate::error::HouseholdError;
use crate::models::{Currency, UserId};

/// User settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// ISO 4217 code used when `budget create` is given no currency
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Acting user for audit stamps; generated on first save when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_owner: Option<UserId>,

    /// tracing level for this crate (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_currency: default_currency(),
            default_owner: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &HouseholdPaths) -> Result<Self, HouseholdError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| HouseholdError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| HouseholdError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &HouseholdPaths) -> Result<(), HouseholdError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            HouseholdError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| HouseholdError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// The configured default currency, validated
    pub fn currency(&self) -> Result<Currency, HouseholdError> {
        Currency::parse(&self.default_currency).map_err(|e| {
            HouseholdError::Config(format!("Invalid default currency in settings: {}", e))
        })
    }

    /// The acting user, creating and persisting one on first use
    pub fn owner_or_init(&mut self, paths: &HouseholdPaths) -> Result<UserId, HouseholdError> {
        if let Some(owner) = self.default_owner {
            return Ok(owner);
        }

        let owner = UserId::new();
        self.default_owner = Some(owner);
        self.save(paths)?;
        tracing::info!(%owner, "generated default owner");
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.log_level, "warn");
        assert!(settings.default_owner.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            default_currency: "ZAR".into(),
            default_owner: Some(UserId::new()),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.currency().unwrap().code(), "ZAR");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"default_currency":"EUR"}"#).unwrap();
        assert_eq!(settings.default_currency, "EUR");
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_owner_is_generated_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::load_or_create(&paths).unwrap();
        let first = settings.owner_or_init(&paths).unwrap();

        let mut reloaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(reloaded.owner_or_init(&paths).unwrap(), first);
    }

    #[test]
    fn test_invalid_currency_is_config_error() {
        let settings = Settings {
            default_currency: "dollars".into(),
            ..Settings::default()
        };
        assert!(matches!(settings.currency(), Err(HouseholdError::Config(_))));
    }
}
