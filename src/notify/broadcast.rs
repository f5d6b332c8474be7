//! Broadcast Notifier
//!
//! Fans snapshot events out to any number of subscribers over a bounded
//! `tokio::sync::broadcast` channel.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::{Notifier, SnapshotEvent};

// == Broadcast Notifier ==
/// Non-blocking fan-out notifier.
///
/// Sending never waits. Events published while nobody is subscribed are
/// dropped, and a subscriber that falls more than `buffer` events behind
/// loses the oldest ones.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Arc<SnapshotEvent>>,
}

impl BroadcastNotifier {
    // == Constructor ==
    /// Creates a notifier retaining up to `buffer` undelivered events per
    /// subscriber. A zero buffer is raised to one.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    // == Subscribe ==
    /// Starts receiving events published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, event: SnapshotEvent) {
        let version = event.version;
        match self.sender.send(Arc::new(event)) {
            Ok(receivers) => debug!(version, receivers, "published cache snapshot"),
            Err(_) => debug!(version, "no subscribers, snapshot dropped"),
        }
    }
}

// == Subscription ==
/// Receiving end of a [`BroadcastNotifier`].
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Arc<SnapshotEvent>>,
}

impl Subscription {
    /// Waits for the next event.
    ///
    /// Skips over events lost to lag. Returns `None` once the notifier has
    /// been dropped.
    pub async fn next(&mut self) -> Option<Arc<SnapshotEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "snapshot subscriber lagged, oldest events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeCause;

    fn event(version: u64) -> SnapshotEvent {
        SnapshotEvent {
            version,
            cause: ChangeCause::Set,
            entries: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_block() {
        let notifier = BroadcastNotifier::new(1);
        for version in 1..=10 {
            notifier.publish(event(version));
        }
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let notifier = BroadcastNotifier::new(8);
        let mut sub = notifier.subscribe();

        notifier.publish(event(1));
        notifier.publish(event(2));

        assert_eq!(sub.next().await.unwrap().version, 1);
        assert_eq!(sub.next().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_fan_out_to_every_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.publish(event(7));

        assert_eq!(first.next().await.unwrap().version, 7);
        assert_eq!(second.next().await.unwrap().version, 7);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_drops_oldest() {
        let notifier = BroadcastNotifier::new(2);
        let mut sub = notifier.subscribe();

        for version in 1..=5 {
            notifier.publish(event(version));
        }

        assert_eq!(sub.next().await.unwrap().version, 4);
        assert_eq!(sub.next().await.unwrap().version, 5);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_notifier_dropped() {
        let notifier = BroadcastNotifier::new(2);
        let mut sub = notifier.subscribe();
        drop(notifier);

        assert!(sub.next().await.is_none());
    }

    #[test]
    fn test_event_serializes_cause() {
        let json = serde_json::to_value(event(3)).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["cause"], "set");
        assert!(json["entries"].as_object().unwrap().is_empty());
    }
}
