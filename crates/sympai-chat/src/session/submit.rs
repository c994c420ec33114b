//! One user submission: placeholder, reply stream, post-stream pipeline.

use std::sync::Arc;

use sympai_common::{new_correlation_id, SessionId};
use tracing::{debug, error, info};

use crate::budget::TokenCounter;
use crate::store::{push_placeholder, ChatFlags, ConversationStore, GeneratingGuard};
use crate::token_tracker::UsageRecorder;
use crate::{ChatConfig, ChatError, ChatTransport};

use super::post_stream::PostStream;
use super::state::StreamState;
use super::stream::StreamSession;

/// Settings that apply to every submission.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// Locale named in the title prompt.
    pub locale: String,
    /// Model charged for title exchanges.
    pub title_model: String,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            title_model: ChatConfig::default().model,
        }
    }
}

/// Result of a submission that got as far as opening a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub state: StreamState,
    pub deltas_applied: usize,
    /// Reply text applied during this submission.
    pub text: String,
    pub title: Option<String>,
}

/// Wires the transport, store, flags, and accounting together.
pub struct Submitter {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn ConversationStore>,
    flags: Arc<ChatFlags>,
    usage: Arc<dyn UsageRecorder>,
    counter: Arc<dyn TokenCounter>,
    settings: SubmitSettings,
}

impl Submitter {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn ConversationStore>,
        flags: Arc<ChatFlags>,
        usage: Arc<dyn UsageRecorder>,
        counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            transport,
            store,
            flags,
            usage,
            counter,
            settings: SubmitSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SubmitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Generate the assistant reply for conversation `id`.
    ///
    /// Fails with `Busy` without touching anything if another submission is
    /// generating. Otherwise `generating` is set for the duration and
    /// cleared on every exit path; any error is also left in the flags'
    /// error slot.
    pub async fn submit(&self, id: &SessionId) -> Result<SubmitReport, ChatError> {
        let _generating = GeneratingGuard::acquire(&self.flags)?;
        self.flags.clear_error();

        let run = new_correlation_id();
        debug!(session = %id, run = %run, "submission started");
        let result = self.run(id).await;
        if let Err(ref e) = result {
            error!(session = %id, run = %run, error = %e, "submission failed");
            self.flags.set_error(e.to_string());
        }
        result
    }

    async fn run(&self, id: &SessionId) -> Result<SubmitReport, ChatError> {
        let snapshot = self.store.snapshot().ok_or(ChatError::NoSnapshot)?;
        let session = snapshot
            .session(id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
        let history = session.messages.clone();
        let config = session.config.clone();
        drop(snapshot);

        push_placeholder(self.store.as_ref(), id)?;

        let mut stream = StreamSession::new(id.clone(), self.store.as_ref(), &self.flags);
        let streamed = stream
            .run(
                self.transport.as_ref(),
                self.counter.as_ref(),
                &history,
                &config,
            )
            .await;

        let pipeline = PostStream {
            transport: self.transport.as_ref(),
            store: self.store.as_ref(),
            flags: &self.flags,
            usage: self.usage.as_ref(),
            locale: &self.settings.locale,
            title_model: &self.settings.title_model,
        };
        let outcome = pipeline.run(id, stream.state()).await;

        // The stream error happened first, so a pipeline error supersedes it.
        let last_error = outcome.error.or(streamed.err());
        if let Some(e) = last_error {
            return Err(e);
        }

        info!(session = %id, deltas = stream.deltas_applied(), "reply complete");
        Ok(SubmitReport {
            state: stream.state(),
            deltas_applied: stream.deltas_applied(),
            text: stream.text().to_string(),
            title: outcome.title,
        })
    }
}
