//! Conversation store and copy-on-write snapshots.
//!
//! The store only ever hands out immutable `Arc<Snapshot>`s. Writers build a
//! full replacement from the freshest snapshot and publish it whole; nothing
//! is mutated in place.

mod flags;
mod merge;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use sympai_common::{Event, EventBus, SessionId};
use tracing::trace;

use crate::{ChatConfig, ChatError, Message};

pub use flags::{ChatFlags, GeneratingGuard};
pub use merge::{apply_delta, apply_title, push_placeholder};

/// One conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub config: ChatConfig,
    /// Set once, when an auto-generated title has been applied.
    pub title_set: bool,
}

impl ConversationSession {
    pub fn new(title: impl Into<String>, config: ChatConfig) -> Self {
        Self {
            id: SessionId::new(),
            title: title.into(),
            messages: Vec::new(),
            config,
            title_set: false,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Every conversation at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sessions: Vec<ConversationSession>,
    /// Bumped by the store on every replacement.
    pub revision: u64,
}

impl Snapshot {
    pub fn new(sessions: Vec<ConversationSession>) -> Self {
        Self {
            sessions,
            revision: 0,
        }
    }

    pub fn session(&self, id: &SessionId) -> Option<&ConversationSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn session_mut(&mut self, id: &SessionId) -> Option<&mut ConversationSession> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    /// Add a conversation at the front, most recent first.
    pub fn insert(&mut self, session: ConversationSession) {
        self.sessions.insert(0, session);
    }
}

/// Snapshot holder shared by every component that reads or writes
/// conversations.
pub trait ConversationStore: Send + Sync {
    /// The current snapshot, if any conversations are loaded.
    fn snapshot(&self) -> Option<Arc<Snapshot>>;

    /// Publish `next` as the new current snapshot.
    fn replace(&self, next: Snapshot);

    /// Copy the freshest snapshot, let `edit` change the copy, publish it.
    ///
    /// Nothing is published when `edit` fails.
    fn update(
        &self,
        edit: &mut dyn FnMut(&mut Snapshot) -> Result<(), ChatError>,
    ) -> Result<(), ChatError> {
        let current = self.snapshot().ok_or(ChatError::NoSnapshot)?;
        let mut next = Snapshot::clone(&current);
        edit(&mut next)?;
        self.replace(next);
        Ok(())
    }
}

/// `ConversationStore` backed by an atomically swapped `Arc<Snapshot>`.
#[derive(Default)]
pub struct InMemoryStore {
    current: ArcSwapOption<Snapshot>,
    events: Option<Arc<EventBus>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(snapshot),
            events: None,
        }
    }

    /// Announce every replacement on `bus`.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    fn notify(&self, revision: u64) {
        trace!(revision, "snapshot replaced");
        if let Some(ref bus) = self.events {
            bus.publish(Event::SnapshotReplaced { revision });
        }
    }
}

impl ConversationStore for InMemoryStore {
    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    fn replace(&self, mut next: Snapshot) {
        let revision = self
            .current
            .load_full()
            .map_or(0, |current| current.revision + 1);
        next.revision = revision;
        self.current.store(Some(Arc::new(next)));
        self.notify(revision);
    }

    fn update(
        &self,
        edit: &mut dyn FnMut(&mut Snapshot) -> Result<(), ChatError>,
    ) -> Result<(), ChatError> {
        let mut outcome = Ok(());
        let mut revision = 0;
        self.current.rcu(|current| {
            let Some(current) = current else {
                outcome = Err(ChatError::NoSnapshot);
                return None;
            };
            let mut next = Snapshot::clone(current);
            match edit(&mut next) {
                Ok(()) => {
                    revision = current.revision + 1;
                    next.revision = revision;
                    outcome = Ok(());
                    Some(Arc::new(next))
                }
                Err(e) => {
                    outcome = Err(e);
                    Some(Arc::clone(current))
                }
            }
        });
        if outcome.is_ok() {
            self.notify(revision);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(session: ConversationSession) -> InMemoryStore {
        InMemoryStore::with_snapshot(Snapshot::new(vec![session]))
    }

    #[test]
    fn empty_store_has_no_snapshot() {
        let store = InMemoryStore::new();
        assert!(store.snapshot().is_none());
        let result = store.update(&mut |_| Ok(()));
        assert!(matches!(result, Err(ChatError::NoSnapshot)));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn replace_bumps_revision() {
        let store = store_with(ConversationSession::new("a", ChatConfig::default()));
        let before = store.snapshot().unwrap();
        assert_eq!(before.revision, 0);

        store.replace(Snapshot::clone(&before));
        assert_eq!(store.snapshot().unwrap().revision, 1);
    }

    #[test]
    fn readers_keep_their_snapshot_after_replace() {
        let session = ConversationSession::new("a", ChatConfig::default());
        let id = session.id.clone();
        let store = store_with(session);

        let held = store.snapshot().unwrap();
        store
            .update(&mut |snap| {
                snap.session_mut(&id).unwrap().title = "b".into();
                Ok(())
            })
            .unwrap();

        assert_eq!(held.session(&id).unwrap().title, "a");
        assert_eq!(store.snapshot().unwrap().session(&id).unwrap().title, "b");
    }

    #[test]
    fn failed_update_publishes_nothing() {
        let store = store_with(ConversationSession::new("a", ChatConfig::default()));
        let before = store.snapshot().unwrap();

        let result = store.update(&mut |snap| {
            snap.sessions.clear();
            Err(ChatError::NoMessages)
        });
        assert!(matches!(result, Err(ChatError::NoMessages)));

        let after = store.snapshot().unwrap();
        assert_eq!(after.revision, before.revision);
        assert_eq!(after.sessions.len(), 1);
    }

    #[tokio::test]
    async fn replacements_are_announced() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let store = store_with(ConversationSession::new("a", ChatConfig::default()))
            .with_events(Arc::clone(&bus));

        store.update(&mut |_| Ok(())).unwrap();
        match rx.recv().await.unwrap() {
            Event::SnapshotReplaced { revision } => assert_eq!(revision, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn insert_puts_newest_first() {
        let mut snapshot = Snapshot::default();
        snapshot.insert(ConversationSession::new("old", ChatConfig::default()));
        snapshot.insert(ConversationSession::new("new", ChatConfig::default()));
        assert_eq!(snapshot.sessions[0].title, "new");
    }
}
