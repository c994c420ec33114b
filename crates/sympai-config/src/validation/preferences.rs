//! Validation for `[preferences]`.

use crate::schema::{SympaiConfig, SELECTABLE_LANGUAGES};

pub(crate) fn validate_preferences(errors: &mut Vec<String>, config: &SympaiConfig) {
    let language = config.preferences.language.as_str();
    if !SELECTABLE_LANGUAGES.contains(&language) {
        errors.push(format!(
            "preferences.language = {language:?} is not one of {}",
            SELECTABLE_LANGUAGES.join(", ")
        ));
    }
}
