//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = SympaiConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_non_http_endpoint() {
    let mut config = SympaiConfig::default();
    config.api.endpoint = "ftp://example.org".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.endpoint"));
}

#[test]
fn accepts_https_endpoint_with_path() {
    let mut config = SympaiConfig::default();
    config.api.endpoint = "https://chat.example.org/sympai".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_empty_client_id() {
    let mut config = SympaiConfig::default();
    config.api.client_id = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.client_id"));
}

#[test]
fn catches_connect_timeout_zero() {
    let mut config = SympaiConfig::default();
    config.api.connect_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("api.connect_timeout_secs"));
}

#[test]
fn catches_zero_max_tokens() {
    let mut config = SympaiConfig::default();
    config.chat.max_tokens = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.max_tokens = 0 is out of range [1, 128000]"));
}

#[test]
fn catches_sampling_out_of_range() {
    let mut config = SympaiConfig::default();
    config.chat.temperature = 2.5;
    config.chat.top_p = -0.1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.temperature"));
    assert!(err.contains("chat.top_p"));
}

#[test]
fn catches_penalties_out_of_range() {
    let mut config = SympaiConfig::default();
    config.chat.presence_penalty = 3.0;
    config.chat.frequency_penalty = -3.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.presence_penalty"));
    assert!(err.contains("chat.frequency_penalty"));
}

#[test]
fn catches_unknown_language() {
    let mut config = SympaiConfig::default();
    config.preferences.language = "klingon".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("preferences.language"));
}

#[test]
fn every_selectable_language_validates() {
    for lang in SELECTABLE_LANGUAGES {
        let mut config = SympaiConfig::default();
        config.preferences.language = (*lang).to_string();
        assert!(validate(&config).is_ok(), "{lang} should validate");
    }
}

#[test]
fn collects_multiple_errors() {
    let mut config = SympaiConfig::default();
    config.chat.max_tokens = 0;
    config.preferences.language = "xx".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.max_tokens"));
    assert!(err.contains("preferences.language"));
    assert!(err.contains("; "));
}
