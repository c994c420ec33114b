//! Merge rules for writing stream output into the conversation store.
//!
//! Every operation re-reads the store right before writing, copies the whole
//! snapshot, touches exactly one field of one conversation, and publishes
//! the copy.

use sympai_common::SessionId;

use crate::{ChatError, Message};

use super::ConversationStore;

/// Append the empty assistant message that incoming deltas will grow.
pub fn push_placeholder(store: &dyn ConversationStore, id: &SessionId) -> Result<(), ChatError> {
    store.update(&mut |snapshot| {
        let session = snapshot
            .session_mut(id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
        session.messages.push(Message::assistant(""));
        Ok(())
    })
}

/// Append `delta` to the last message of conversation `id`.
///
/// Empty deltas are a no-op and publish nothing.
pub fn apply_delta(
    store: &dyn ConversationStore,
    id: &SessionId,
    delta: &str,
) -> Result<(), ChatError> {
    if delta.is_empty() {
        return Ok(());
    }
    store.update(&mut |snapshot| {
        let session = snapshot
            .session_mut(id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
        let last = session.messages.last_mut().ok_or(ChatError::NoMessages)?;
        last.content.push_str(delta);
        Ok(())
    })
}

/// Set the title of conversation `id` and mark it as titled.
pub fn apply_title(store: &dyn ConversationStore, id: &SessionId, title: &str) -> Result<(), ChatError> {
    store.update(&mut |snapshot| {
        let session = snapshot
            .session_mut(id)
            .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
        session.title = title.to_string();
        session.title_set = true;
        Ok(())
    })
}
