//! The notification channel: fan-out of ranking snapshots to observers.
//!
//! Built on [`tokio::sync::broadcast`].  Delivery is per-subscriber and
//! best-effort: a slow subscriber that falls behind the ring capacity skips
//! ahead to newer snapshots, and never blocks the publisher or its peers.

use tokio::sync::broadcast;

use pointboard_shared::protocol::RankingsSnapshot;

/// Snapshots retained for slow subscribers before they start skipping.
const CHANNEL_CAPACITY: usize = 64;

/// Handle to the rankings broadcast channel.  Cheap to clone.
#[derive(Clone)]
pub struct RankingUpdates {
    tx: broadcast::Sender<RankingsSnapshot>,
}

impl RankingUpdates {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a new observer.  Each receiver sees snapshots in publish
    /// order, starting from the next publication.
    pub fn subscribe(&self) -> broadcast::Receiver<RankingsSnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all current subscribers.
    ///
    /// Never fails from the caller's perspective; having no subscribers is
    /// not an error.
    pub fn publish(&self, snapshot: RankingsSnapshot) {
        match self.tx.send(snapshot) {
            Ok(subscribers) => {
                tracing::debug!(subscribers, "published rankings snapshot");
            }
            Err(_) => {
                tracing::debug!("rankings snapshot published with no subscribers");
            }
        }
    }

    /// Number of currently connected observers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for RankingUpdates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let updates = RankingUpdates::new();
        let mut rx = updates.subscribe();

        let empty = RankingsSnapshot::new(Vec::new());
        updates.publish(empty.clone());
        updates.publish(empty.clone());

        assert_eq!(rx.recv().await.unwrap(), empty);
        assert_eq!(rx.recv().await.unwrap(), empty);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let updates = RankingUpdates::new();
        updates.publish(RankingsSnapshot::new(Vec::new()));
        assert_eq!(updates.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn each_subscriber_gets_its_own_copy() {
        let updates = RankingUpdates::new();
        let mut a = updates.subscribe();
        let mut b = updates.subscribe();

        updates.publish(RankingsSnapshot::new(Vec::new()));

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
