//! The request/response cycle of one reply stream.

use sympai_common::SessionId;
use tracing::{debug, warn};

use crate::api::{CancelReason, StreamRequest};
use crate::budget::{limit_message_tokens, TokenCounter};
use crate::frame::{decode_or_empty, FrameBuffer};
use crate::store::{apply_delta, ChatFlags, ConversationStore};
use crate::{ChatConfig, ChatError, ChatTransport, Message};

use super::state::StreamState;

/// Drives one reply stream into the last message of one conversation.
///
/// Frames are applied strictly in arrival order. The user stop flag is only
/// consulted once the stream has been drained, to pick the close reason.
pub struct StreamSession<'a> {
    session_id: SessionId,
    store: &'a dyn ConversationStore,
    flags: &'a ChatFlags,
    buffer: FrameBuffer,
    text: String,
    deltas_applied: usize,
    state: StreamState,
}

impl<'a> StreamSession<'a> {
    pub fn new(
        session_id: SessionId,
        store: &'a dyn ConversationStore,
        flags: &'a ChatFlags,
    ) -> Self {
        Self {
            session_id,
            store,
            flags,
            buffer: FrameBuffer::new(),
            text: String::new(),
            deltas_applied: 0,
            state: StreamState::Idle,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Everything applied to the conversation so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn deltas_applied(&self) -> usize {
        self.deltas_applied
    }

    /// Run the stream to a terminal state.
    ///
    /// `history` is the conversation as it was before the assistant
    /// placeholder was appended. On error the session ends `Errored` and the
    /// text applied before the failure stays in the store.
    pub async fn run(
        &mut self,
        transport: &dyn ChatTransport,
        counter: &dyn TokenCounter,
        history: &[Message],
        config: &ChatConfig,
    ) -> Result<CancelReason, ChatError> {
        self.transition(StreamState::Requesting);
        match self.drive(transport, counter, history, config).await {
            Ok(reason) => Ok(reason),
            Err(e) => {
                warn!(session = %self.session_id, state = %self.state, error = %e, "reply stream failed");
                self.transition(StreamState::Errored);
                Err(e)
            }
        }
    }

    async fn drive(
        &mut self,
        transport: &dyn ChatTransport,
        counter: &dyn TokenCounter,
        history: &[Message],
        config: &ChatConfig,
    ) -> Result<CancelReason, ChatError> {
        if history.is_empty() {
            return Err(ChatError::NoMessages);
        }

        let trimmed = limit_message_tokens(
            counter,
            history,
            u64::from(config.max_tokens),
            &config.model,
        );
        let latest = trimmed.last().ok_or(ChatError::TokenBudgetExceeded)?;
        debug!(
            session = %self.session_id,
            kept = trimmed.len(),
            of = history.len(),
            "history trimmed to token budget"
        );

        let request = StreamRequest {
            message: latest.content.clone(),
            session_id: self.session_id.to_string(),
        };
        let handle = transport.open_stream(&request).await?;
        if handle.is_locked() {
            return Err(ChatError::StreamLocked);
        }
        let mut reader = handle.reader()?;
        self.transition(StreamState::Streaming);

        while let Some(chunk) = reader.read().await? {
            for frame in self.buffer.append(&chunk) {
                self.apply_frame(&frame)?;
            }
        }

        self.transition(StreamState::Draining);
        if let Some(frame) = self.buffer.flush() {
            self.apply_frame(&frame)?;
        }

        let reason = if self.flags.is_generating() {
            CancelReason::Completed
        } else {
            CancelReason::UserCancelled
        };
        reader.release_lock().cancel(reason);
        self.transition(StreamState::Completed);
        Ok(reason)
    }

    fn apply_frame(&mut self, frame: &str) -> Result<(), ChatError> {
        let delta = decode_or_empty(frame);
        if delta.is_empty() {
            return Ok(());
        }
        apply_delta(self.store, &self.session_id, &delta)?;
        self.text.push_str(&delta);
        self.deltas_applied += 1;
        Ok(())
    }

    fn transition(&mut self, next: StreamState) {
        debug_assert!(
            self.state.can_become(next),
            "illegal stream transition {} -> {}",
            self.state,
            next
        );
        debug!(session = %self.session_id, from = %self.state, to = %next, "stream state");
        self.state = next;
    }
}
