//! Backend connection settings.

use serde::{Deserialize, Serialize};

/// Backend endpoint and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the chat backend (`/api/chat` and `/api/generate_title`
    /// are resolved against it).
    pub endpoint: String,
    /// Bearer token. Empty means "no key".
    pub api_key: String,
    /// Sent as `User-Agent`; the backend rejects other agents.
    pub client_id: String,
    /// Connect timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
}

impl std::fmt::Debug for ApiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSection")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".into(),
            api_key: String::new(),
            client_id: "sympai".into(),
            connect_timeout_secs: 10,
        }
    }
}

impl ApiSection {
    /// The configured key, if any.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_key() {
        let section = ApiSection {
            api_key: "sk-secret".into(),
            ..Default::default()
        };
        let debug = format!("{section:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn blank_key_is_none() {
        let mut section = ApiSection::default();
        assert_eq!(section.api_key(), None);
        section.api_key = "   ".into();
        assert_eq!(section.api_key(), None);
        section.api_key = "sk-1".into();
        assert_eq!(section.api_key(), Some("sk-1"));
    }
}
