//! Streaming chat core for SympAI.
//!
//! Consumes the backend's incremental text-delta stream and applies it to
//! a shared conversation store:
//! - Frame buffering and decoding of the `data: {"text": ...}` wire format
//! - HTTP transport with per-conversation stream locks
//! - Copy-on-write conversation store and merge rules
//! - The stream session state machine driving one submission
//! - Post-stream usage accounting and one-shot auto-titling

pub mod api;
pub mod budget;
pub mod frame;
pub mod session;
pub mod store;
pub mod token_tracker;

use async_trait::async_trait;
use sympai_common::{SessionId, SympaiError};

pub use api::{
    CancelReason, HttpTransport, StreamHandle, StreamReader, StreamRequest, TitleRequest,
    TransportConfig, OFFICIAL_API_ENDPOINT,
};
pub use budget::{limit_message_tokens, ApproxTokenCounter, TokenCounter};
pub use frame::{decode_frame, FrameBuffer};
pub use session::{StreamSession, StreamState, SubmitReport, SubmitSettings, Submitter};
pub use store::{ChatFlags, ConversationSession, ConversationStore, InMemoryStore, Snapshot};
pub use token_tracker::{TokenUsage, UsageAccountant, UsageRecorder};

/// The two backend exchanges a submission performs.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// `POST /api/chat`: open the reply byte stream.
    async fn open_stream(&self, request: &StreamRequest) -> Result<StreamHandle, ChatError>;

    /// `POST /api/generate_title`: one-shot, not streamed.
    async fn generate_title(&self, request: &TitleRequest) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Per-conversation generation parameters. Fixed for the duration of a submission.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 4000,
            temperature: 1.0,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

impl ChatConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("a reply is already being generated")]
    Busy,
    #[error("no conversations loaded")]
    NoSnapshot,
    #[error("conversation {0} not found")]
    SessionNotFound(SessionId),
    #[error("No messages submitted!")]
    NoMessages,
    #[error("Message exceed max token!")]
    TokenBudgetExceeded,
    #[error("an API key is required for the official endpoint")]
    MissingApiKey,
    #[error("Oops, the stream is locked right now. Please try again")]
    StreamLocked,
    /// Non-2xx response; the body is surfaced verbatim.
    #[error("{0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("Error generating title!\n{0}")]
    Title(String),
    #[error("usage accounting failed: {0}")]
    Usage(String),
}

impl From<ChatError> for SympaiError {
    fn from(e: ChatError) -> Self {
        SympaiError::Chat(e.to_string())
    }
}
