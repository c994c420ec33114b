//! SympAI client configuration.
//!
//! TOML-based configuration for the chat client: backend endpoint and
//! credentials, default chat parameters for new conversations, user
//! preferences (auto-title, token accounting, language) and logging.
//! All sections use serde defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sympai_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{SympaiConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use sympai_common::ConfigError;

/// Load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory (creating a default if
/// none exists), applies `SYMPAI_*` environment overrides, and validates
/// the result.
pub fn load_config() -> Result<SympaiConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    env::apply_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path, then apply environment overrides.
pub fn load_config_from(path: &Path) -> Result<SympaiConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    let mut config = toml_loader::load_from_path(path)?;
    env::apply_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &SympaiConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = SympaiConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"api\""));
        assert!(json.contains("\"chat\""));
        assert!(json.contains("\"preferences\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = SympaiConfig::default();
        let json = config_to_json(&config);
        let parsed: SympaiConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api.client_id, "sympai");
        assert_eq!(parsed.chat.model, "gpt-3.5-turbo");
        assert_eq!(parsed.preferences.language, "en-US");
    }

    #[test]
    fn load_config_from_missing_path_is_file_not_found() {
        let err = load_config_from(Path::new("/tmp/definitely_missing_sympai.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_config_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nmax_tokens = 0\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
