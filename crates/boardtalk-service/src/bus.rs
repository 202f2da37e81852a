use boardtalk_core::event::CommentEvent;
use tokio::sync::broadcast;

pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// In-process push channel for comment events. Clones share the underlying
/// channel; a receiver observes every event published after it subscribed.
/// Delivery is best effort: events with no live subscriber are dropped, and a
/// receiver that falls behind the buffer loses the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CommentEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommentEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: CommentEvent) {
        if self.sender.receiver_count() > 0 {
            let _ = self.sender.send(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use boardtalk_core::event::CommentEventKind;
    use tokio::time::timeout;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(1);

    fn event(task_id: &str, kind: CommentEventKind) -> CommentEvent {
        CommentEvent {
            kind,
            task_id: task_id.to_string(),
            comment_id: "c1".to_string(),
            message: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(event("t1", CommentEventKind::Created));

        let received = timeout(TEST_TIMEOUT, rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        assert_eq!(received.task_id, "t1");
        assert_eq!(received.kind, CommentEventKind::Created);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        bus.publish(event("t1", CommentEventKind::Deleted));

        let mut rx = bus.subscribe();
        bus.publish(event("t2", CommentEventKind::Updated));

        let received = timeout(TEST_TIMEOUT, rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        assert_eq!(received.task_id, "t2");
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(event("t1", CommentEventKind::Created));

        for rx in [&mut a, &mut b] {
            let received = timeout(TEST_TIMEOUT, rx.recv())
                .await
                .expect("timed out")
                .expect("channel closed");
            assert_eq!(received.kind, CommentEventKind::Created);
        }
    }

    #[tokio::test]
    async fn dropped_receiver_leaves_bus_usable() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);

        let mut rx2 = bus.subscribe();
        bus.publish(event("t1", CommentEventKind::Created));
        assert!(timeout(TEST_TIMEOUT, rx2.recv()).await.is_ok());
    }
}
