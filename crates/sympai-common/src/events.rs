use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::SessionId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// The conversation store swapped in a new snapshot.
    SnapshotReplaced { revision: u64 },
    GeneratingChanged(bool),
    TitleSet { session: SessionId, title: String },
    SubmissionFailed(String),
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::SnapshotReplaced { revision: 3 });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::SnapshotReplaced { revision: 3 }));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Event::Shutdown);

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, Event::Shutdown));
        assert!(matches!(e2, Event::Shutdown));
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::GeneratingChanged(true));
        bus.publish(Event::TitleSet {
            session: SessionId::from("s1"),
            title: "Headache relief".into(),
        });
        bus.publish(Event::GeneratingChanged(false));

        let e1 = rx.recv().await.unwrap();
        assert!(matches!(e1, Event::GeneratingChanged(true)));

        let e2 = rx.recv().await.unwrap();
        assert!(
            matches!(e2, Event::TitleSet { ref session, ref title } if session.as_str() == "s1" && title == "Headache relief")
        );

        let e3 = rx.recv().await.unwrap();
        assert!(matches!(e3, Event::GeneratingChanged(false)));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(Event::Shutdown);
        assert_eq!(count, 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Event::Unknown));
    }
}
