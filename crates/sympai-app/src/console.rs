//! Terminal echo of the growing reply.

use std::io::Write;
use std::sync::Arc;

use sympai_chat::ConversationStore;
use sympai_common::{Event, SessionId};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// Tracks how much of the reply has already been printed.
#[derive(Debug, Default)]
pub(crate) struct Echo {
    printed: usize,
}

impl Echo {
    /// The part of `reply` not yet printed.
    pub(crate) fn fresh<'a>(&mut self, reply: &'a str) -> &'a str {
        if reply.len() <= self.printed || !reply.is_char_boundary(self.printed) {
            return "";
        }
        let fresh = &reply[self.printed..];
        self.printed = reply.len();
        fresh
    }
}

/// Content of the reply message, once the placeholder has been appended
/// after the `history_len` messages that were submitted.
fn reply_text(store: &dyn ConversationStore, id: &SessionId, history_len: usize) -> Option<String> {
    let snapshot = store.snapshot()?;
    let session = snapshot.session(id)?;
    if session.messages.len() <= history_len {
        return None;
    }
    session.last_message().map(|m| m.content.clone())
}

fn print_fresh(echo: &mut Echo, store: &dyn ConversationStore, id: &SessionId, history_len: usize) {
    if let Some(reply) = reply_text(store, id, history_len) {
        let fresh = echo.fresh(&reply);
        if !fresh.is_empty() {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(fresh.as_bytes());
            let _ = out.flush();
        }
    }
}

/// Print reply text as snapshots arrive until `Event::Shutdown`.
pub(crate) async fn run(
    mut events: broadcast::Receiver<Event>,
    store: Arc<dyn ConversationStore>,
    id: SessionId,
    history_len: usize,
) {
    let mut echo = Echo::default();
    loop {
        match events.recv().await {
            Ok(Event::SnapshotReplaced { .. }) => {
                print_fresh(&mut echo, store.as_ref(), &id, history_len);
            }
            Ok(Event::GeneratingChanged(false)) => {
                eprintln!("\n[stop requested, finishing the current reply]");
            }
            Ok(Event::TitleSet { title, .. }) => {
                println!("\n\n[{title}]");
            }
            Ok(Event::SubmissionFailed(message)) => {
                eprintln!("\nerror: {message}");
            }
            Ok(Event::Shutdown) => {
                print_fresh(&mut echo, store.as_ref(), &id, history_len);
                println!();
                break;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "console lagged behind snapshot events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
