//! User preferences that steer the post-reply pipeline.

use serde::{Deserialize, Serialize};

/// Languages the client can be switched to.
pub const SELECTABLE_LANGUAGES: &[&str] = &[
    "en-US", "zh-CN", "zh-TW", "da", "de", "es", "fr", "it", "ja", "ms", "nb", "ro", "ru", "sv",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Name new conversations after their first exchange.
    pub auto_title: bool,
    /// Keep per-model token usage totals.
    pub count_total_tokens: bool,
    /// Locale embedded in the title prompt.
    pub language: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            auto_title: true,
            count_total_tokens: true,
            language: "en-US".into(),
        }
    }
}
