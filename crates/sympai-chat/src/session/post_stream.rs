//! Work done after the reply stream ends: usage accounting, then the
//! one-shot auto-title exchange.

use sympai_common::SessionId;
use tracing::{debug, info, warn};

use crate::api::TitleRequest;
use crate::store::{apply_title, ChatFlags, ConversationStore};
use crate::token_tracker::UsageRecorder;
use crate::{ChatError, ChatTransport, Message, Role};

use super::state::StreamState;

/// What the pipeline produced. `error` is the last failure, if any step failed.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub title: Option<String>,
    pub error: Option<ChatError>,
}

pub(crate) struct PostStream<'a> {
    pub transport: &'a dyn ChatTransport,
    pub store: &'a dyn ConversationStore,
    pub flags: &'a ChatFlags,
    pub usage: &'a dyn UsageRecorder,
    pub locale: &'a str,
    pub title_model: &'a str,
}

impl PostStream<'_> {
    /// Each step runs regardless of earlier failures; a later failure
    /// replaces an earlier one in the outcome.
    pub async fn run(&self, id: &SessionId, stream_state: StreamState) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();

        if let Err(e) = self.account_reply(id) {
            warn!(session = %id, error = %e, "usage accounting failed");
            outcome.error = Some(e);
        }

        if stream_state == StreamState::Completed {
            match self.auto_title(id).await {
                Ok(title) => outcome.title = title,
                Err(e) => {
                    warn!(session = %id, error = %e, "auto-title failed");
                    outcome.error = Some(e);
                }
            }
        }

        outcome
    }

    /// Record the reply's usage: everything before the final message is the
    /// prompt, the final message is the completion.
    fn account_reply(&self, id: &SessionId) -> Result<(), ChatError> {
        if !self.flags.count_total_tokens() {
            return Ok(());
        }
        let Some(snapshot) = self.store.snapshot() else {
            return Ok(());
        };
        let Some(session) = snapshot.session(id) else {
            return Ok(());
        };
        let Some((last, prior)) = session.messages.split_last() else {
            return Ok(());
        };
        self.usage.record_usage(&session.config.model, prior, last)
    }

    async fn auto_title(&self, id: &SessionId) -> Result<Option<String>, ChatError> {
        if !self.flags.auto_title() {
            return Ok(None);
        }
        let Some(snapshot) = self.store.snapshot() else {
            return Ok(None);
        };
        let session = snapshot
            .session(id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
        if session.title_set {
            return Ok(None);
        }
        let Some((assistant, earlier)) = session.messages.split_last() else {
            return Ok(None);
        };
        let user = earlier
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let prompt = title_prompt(user, &assistant.content, self.locale);
        debug!(session = %id, "requesting title");
        let raw = self
            .transport
            .generate_title(&TitleRequest {
                message: prompt.clone(),
            })
            .await
            .map_err(|e| ChatError::Title(e.to_string()))?;

        let title = clean_title(&raw);
        apply_title(self.store, id, &title)?;
        info!(session = %id, title = %title, "conversation titled");

        if self.flags.count_total_tokens() {
            self.usage.record_usage(
                self.title_model,
                &[Message::user(prompt)],
                &Message::assistant(title.clone()),
            )?;
        }
        Ok(Some(title))
    }
}

pub fn title_prompt(user: &str, assistant: &str, locale: &str) -> String {
    format!(
        "Generate a title in less than 6 words for the following message (language: {locale}):\n\"\"\"\nUser: {user}\nAssistant: {assistant}\n\"\"\""
    )
}

/// Trim whitespace, then strip one matching pair of surrounding quotes.
pub fn clean_title(raw: &str) -> String {
    const PAIRS: [(char, char); 3] = [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}')];

    let trimmed = raw.trim();
    for (open, close) in PAIRS {
        if trimmed.chars().count() >= 2 {
            if let Some(inner) = trimmed
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
            {
                return inner.to_string();
            }
        }
    }
    trimmed.to_string()
}
