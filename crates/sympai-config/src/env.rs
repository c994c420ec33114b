//! Environment variable overrides applied on top of the TOML file.

use tracing::debug;

use crate::schema::SympaiConfig;

pub const ENV_API_KEY: &str = "SYMPAI_API_KEY";
pub const ENV_ENDPOINT: &str = "SYMPAI_ENDPOINT";
pub const ENV_LANGUAGE: &str = "SYMPAI_LANGUAGE";

/// Apply `SYMPAI_*` overrides from the process environment.
pub fn apply_overrides(config: &mut SympaiConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using an arbitrary variable lookup. Empty values are ignored.
pub fn apply_overrides_from(config: &mut SympaiConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_API_KEY) {
        debug!("api key taken from {ENV_API_KEY}");
        config.api.api_key = key;
    }
    if let Some(endpoint) = get(ENV_ENDPOINT) {
        debug!(%endpoint, "endpoint taken from {ENV_ENDPOINT}");
        config.api.endpoint = endpoint;
    }
    if let Some(language) = get(ENV_LANGUAGE) {
        config.preferences.language = language;
    }
}
