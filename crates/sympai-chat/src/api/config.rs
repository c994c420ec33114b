//! Backend transport configuration.

use std::fmt;
use std::time::Duration;

use crate::ChatError;

/// Hosted endpoint that refuses anonymous requests.
pub const OFFICIAL_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Transport configuration.
#[derive(Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub client_id: String,
    pub connect_timeout: Duration,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000")
    }
}

impl TransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            client_id: "sympai".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the bearer key. Blank keys are treated as no key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.endpoint.trim_end_matches('/'))
    }

    pub fn title_url(&self) -> String {
        format!("{}/api/generate_title", self.endpoint.trim_end_matches('/'))
    }

    /// Fail before any I/O when the endpoint needs a key and none is set.
    pub fn ensure_credentials(&self) -> Result<(), ChatError> {
        if self.api_key.is_none() && self.endpoint == OFFICIAL_API_ENDPOINT {
            return Err(ChatError::MissingApiKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_resolve_against_endpoint() {
        let config = TransportConfig::new("http://localhost:8000/");
        assert_eq!(config.chat_url(), "http://localhost:8000/api/chat");
        assert_eq!(
            config.title_url(),
            "http://localhost:8000/api/generate_title"
        );
    }

    #[test]
    fn blank_key_is_no_key() {
        let config = TransportConfig::default().with_api_key("  ");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn official_endpoint_requires_key() {
        let config = TransportConfig::new(OFFICIAL_API_ENDPOINT);
        assert!(matches!(
            config.ensure_credentials(),
            Err(ChatError::MissingApiKey)
        ));
        assert!(config.with_api_key("sk-1").ensure_credentials().is_ok());
    }

    #[test]
    fn self_hosted_endpoint_allows_anonymous() {
        assert!(TransportConfig::default().ensure_credentials().is_ok());
    }

    #[test]
    fn debug_redacts_key() {
        let config = TransportConfig::default().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
