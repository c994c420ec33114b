//! Validation for the `[chat]` defaults.

use crate::schema::SympaiConfig;

use super::helpers::{validate_range, validate_range_f64};

pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &SympaiConfig) {
    let chat = &config.chat;
    if chat.model.trim().is_empty() {
        errors.push("chat.model must not be empty".into());
    }
    validate_range(errors, "chat.max_tokens", chat.max_tokens, 1, 128_000);
    validate_range_f64(errors, "chat.temperature", chat.temperature, 0.0, 2.0);
    validate_range_f64(errors, "chat.top_p", chat.top_p, 0.0, 1.0);
    validate_range_f64(
        errors,
        "chat.presence_penalty",
        chat.presence_penalty,
        -2.0,
        2.0,
    );
    validate_range_f64(
        errors,
        "chat.frequency_penalty",
        chat.frequency_penalty,
        -2.0,
        2.0,
    );
}
