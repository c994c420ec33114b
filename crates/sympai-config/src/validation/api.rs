//! Validation for the `[api]` section.

use std::sync::OnceLock;

use regex::Regex;

use crate::schema::SympaiConfig;

use super::helpers::validate_range;

fn endpoint_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://[^\s/]+(/[^\s]*)?$").expect("endpoint pattern is valid")
    })
}

pub(crate) fn validate_api(errors: &mut Vec<String>, config: &SympaiConfig) {
    if !endpoint_pattern().is_match(&config.api.endpoint) {
        errors.push(format!(
            "api.endpoint = {:?} must be an http(s) URL",
            config.api.endpoint
        ));
    }
    if config.api.client_id.trim().is_empty() {
        errors.push("api.client_id must not be empty".into());
    }
    validate_range(
        errors,
        "api.connect_timeout_secs",
        config.api.connect_timeout_secs,
        1,
        120,
    );
}
