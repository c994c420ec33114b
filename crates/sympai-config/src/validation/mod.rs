//! Full configuration validation.
//!
//! Validates numeric ranges, the endpoint URL, and the selected language.
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod api;
mod chat;
mod helpers;
mod preferences;

#[cfg(test)]
mod tests;

use crate::schema::SympaiConfig;
use sympai_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &SympaiConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    api::validate_api(&mut errors, config);
    chat::validate_chat(&mut errors, config);
    preferences::validate_preferences(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
