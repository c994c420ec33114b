//! HTTP transport struct, request bodies, and header building.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::ChatError;

use super::config::TransportConfig;
use super::handle::StreamLocks;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    /// Content of the latest message that survived token trimming.
    pub message: String,
    pub session_id: String,
}

/// Body of `POST /api/generate_title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleRequest {
    pub message: String,
}

/// Reply of `POST /api/generate_title`.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleResponse {
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// SympAI backend client.
pub struct HttpTransport {
    pub(crate) config: TransportConfig,
    pub(crate) http: reqwest::Client,
    pub(crate) locks: StreamLocks,
}

impl HttpTransport {
    /// Build the client. Only the connect phase has a timeout; a stalled
    /// reply stream is waited on until the server closes it.
    pub fn new(config: TransportConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            locks: StreamLocks::new(),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Headers shared by both endpoints.
    pub(crate) fn headers(&self) -> Result<HeaderMap, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.client_id)
                .map_err(|e| ChatError::Parse(format!("invalid client id header: {e}")))?,
        );
        if let Some(ref key) = self.config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| ChatError::Parse(format!("invalid authorization header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

/// Error for a non-2xx reply: the body verbatim, or the status if the body is empty.
pub(crate) async fn error_from_response(response: reqwest::Response) -> ChatError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if text.trim().is_empty() {
        ChatError::Api(format!("HTTP {status}"))
    } else {
        ChatError::Api(text)
    }
}
