//! Configuration schema types for SympAI.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the web client ships with.

mod api;
mod chat;
mod preferences;
mod system;

pub use api::*;
pub use chat::*;
pub use preferences::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for SympAI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SympaiConfig {
    pub api: ApiSection,
    pub chat: ChatDefaults,
    pub preferences: PreferencesConfig,
    pub logging: LoggingConfig,
}
