use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::stream::{self, Stream};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::Sample;

pub type SubscriberId = u64;

/// Registry-side half of a subscriber: the queue's sending end and the
/// liveness flag shared with the [`Subscription`]
struct SubscriberSlot {
    tx: mpsc::Sender<Arc<Sample>>,
    live: Arc<AtomicBool>,
}

impl SubscriberSlot {
    fn disconnect(self) {
        self.live.store(false, Ordering::Release);
    }
}

/// Live subscribers and the fan-out of accepted samples to them.
///
/// Each subscriber owns a bounded queue. Publishing never waits: a
/// subscriber whose queue is full is disconnected on the spot.
pub struct SubscriberRegistry {
    queue_capacity: usize,
    next_id: AtomicU64,
    slots: Mutex<HashMap<SubscriberId, SubscriberSlot>>,
    slow_disconnects: AtomicU64,
    closed: AtomicBool,
}

impl SubscriberRegistry {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            next_id: AtomicU64::new(1),
            slots: Mutex::new(HashMap::new()),
            slow_disconnects: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Attach a subscriber. After [`close_all`](Self::close_all) the returned
    /// handle has already ended.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let live = Arc::new(AtomicBool::new(true));

        {
            let mut slots = self.slots.lock();
            if self.closed.load(Ordering::Acquire) {
                live.store(false, Ordering::Release);
                debug!(subscriber = id, "registry closed, subscriber ended on attach");
            } else {
                slots.insert(
                    id,
                    SubscriberSlot {
                        tx,
                        live: Arc::clone(&live),
                    },
                );
                debug!(subscriber = id, "subscriber attached");
            }
        }

        Subscription {
            id,
            rx,
            live,
            registry: Arc::downgrade(self),
        }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.slots.lock().remove(&id);
        match removed {
            Some(slot) => {
                slot.disconnect();
                debug!(subscriber = id, "subscriber detached");
                true
            }
            None => false,
        }
    }

    /// Push a sample to every subscriber, returning how many accepted it.
    ///
    /// Holding the slot lock for the whole pass keeps per-subscriber order
    /// identical to publish order.
    pub fn publish(&self, sample: &Arc<Sample>) -> usize {
        let mut slots = self.slots.lock();
        if self.closed.load(Ordering::Acquire) {
            return 0;
        }
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (id, slot) in slots.iter() {
            match slot.tx.try_send(Arc::clone(sample)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        subscriber = *id,
                        capacity = self.queue_capacity,
                        "subscriber queue full, disconnecting slow consumer"
                    );
                    self.slow_disconnects.fetch_add(1, Ordering::Relaxed);
                    dropped.push(*id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(*id),
            }
        }

        for id in dropped {
            if let Some(slot) = slots.remove(&id) {
                slot.disconnect();
            }
        }

        delivered
    }

    /// Disconnect every subscriber and refuse new ones; all streams end
    pub fn close_all(&self) {
        let drained: Vec<_> = {
            let mut slots = self.slots.lock();
            self.closed.store(true, Ordering::Release);
            slots.drain().collect()
        };
        for (_, slot) in drained {
            slot.disconnect();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Total subscribers dropped for falling behind
    pub fn slow_disconnects(&self) -> u64 {
        self.slow_disconnects.load(Ordering::Relaxed)
    }
}

/// Receiving handle for one subscriber.
///
/// Yields samples in the order the store accepted them until the handle is
/// dropped, unsubscribed, or disconnected as a slow consumer. Dropping it
/// removes the subscriber from the registry.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<Sample>>,
    live: Arc<AtomicBool>,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Next sample, or `None` once the subscription has ended
    pub async fn recv(&mut self) -> Option<Arc<Sample>> {
        if !self.is_live() {
            self.clear();
            return None;
        }

        let next = self.rx.recv().await;
        self.accept(next)
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<Arc<Sample>> {
        if !self.is_live() {
            self.clear();
            return None;
        }

        let next = self.rx.try_recv().ok();
        self.accept(next)
    }

    /// Turn the handle into a `Stream` of samples
    pub fn into_stream(self) -> impl Stream<Item = Arc<Sample>> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            let sample = sub.recv().await?;
            Some((sample, sub))
        })
    }

    // Samples still queued when the subscriber was disconnected are discarded.
    fn accept(&mut self, next: Option<Arc<Sample>>) -> Option<Arc<Sample>> {
        if self.is_live() {
            next
        } else {
            self.clear();
            None
        }
    }

    fn clear(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures::StreamExt;

    fn sample(quality: f64) -> Arc<Sample> {
        Arc::new(Sample::new("wlan0", Utc::now(), quality, true))
    }

    #[test]
    fn test_delivers_in_publish_order() {
        let registry = Arc::new(SubscriberRegistry::new(16));
        let mut sub = registry.subscribe();

        for i in 0..5 {
            assert_eq!(registry.publish(&sample(i as f64)), 1);
        }

        let received: Vec<f64> = std::iter::from_fn(|| sub.try_recv())
            .map(|s| s.signal_quality)
            .collect();
        assert_eq!(received, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_full_queue_disconnects_subscriber() {
        let registry = Arc::new(SubscriberRegistry::new(2));
        let mut slow = registry.subscribe();
        let mut fast = registry.subscribe();

        registry.publish(&sample(1.0));
        registry.publish(&sample(2.0));
        assert_eq!(fast.try_recv().unwrap().signal_quality, 1.0);
        assert_eq!(fast.try_recv().unwrap().signal_quality, 2.0);

        // slow never drained, third sample overflows it
        assert_eq!(registry.publish(&sample(3.0)), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.slow_disconnects(), 1);

        assert!(!slow.is_live());
        assert!(slow.try_recv().is_none());
        assert_eq!(fast.try_recv().unwrap().signal_quality, 3.0);

        registry.publish(&sample(4.0));
        assert!(slow.try_recv().is_none());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        let mut sub = registry.subscribe();
        let id = sub.id();

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(registry.is_empty());

        assert_eq!(registry.publish(&sample(1.0)), 0);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_drop_releases_slot() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        let sub = registry.subscribe();
        let _other = registry.subscribe();
        assert_eq!(registry.len(), 2);

        drop(sub);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_close_all_ends_every_subscription() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        let mut a = registry.subscribe();
        let mut b = registry.subscribe();
        registry.publish(&sample(1.0));

        registry.close_all();

        assert!(registry.is_empty());
        assert!(a.try_recv().is_none());
        assert!(b.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_after_close_ends_immediately() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        registry.close_all();
        assert!(registry.is_closed());

        let mut sub = registry.subscribe();
        assert!(!sub.is_live());
        assert!(registry.is_empty());

        assert_eq!(registry.publish(&sample(-40.0)), 0);
        assert!(sub.try_recv().is_none());

        let ended = tokio::time::timeout(std::time::Duration::from_secs(1), sub.recv()).await;
        assert!(matches!(ended, Ok(None)));
    }

    #[tokio::test]
    async fn test_stream_ends_after_disconnect() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        let sub = registry.subscribe();
        let id = sub.id();
        let mut stream = Box::pin(sub.into_stream());

        registry.publish(&sample(7.0));
        assert_eq!(stream.next().await.unwrap().signal_quality, 7.0);

        registry.unsubscribe(id);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_recv_wakes_on_publish() {
        let registry = Arc::new(SubscriberRegistry::new(4));
        let mut sub = registry.subscribe();

        let publisher = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                registry.publish(&sample(-42.0));
            })
        };

        let got = sub.recv().await.unwrap();
        assert_eq!(got.signal_quality, -42.0);
        publisher.await.unwrap();
    }
}
