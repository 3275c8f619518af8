use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::domain::{select_best, InterfaceRecord, InterfaceStatus, Sample, StatusSnapshot};

use super::fanout::{SubscriberId, SubscriberRegistry, Subscription};

/// Sizing for [`SampleStore`]
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Samples kept per interface
    pub history_size: usize,
    /// Pending samples a subscriber may hold before it is dropped
    pub subscriber_queue: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_size: 8,
            subscriber_queue: 64,
        }
    }
}

/// In-memory per-interface ring buffers, latest cache and live subscribers.
///
/// Single writer (the scheduler) calls [`update`](Self::update); any number
/// of readers may snapshot or subscribe concurrently. Locks are held only for
/// bounded in-memory work, never across an await or a blocking send.
pub struct SampleStore {
    config: StoreConfig,
    records: RwLock<HashMap<String, InterfaceRecord>>,
    subscribers: Arc<SubscriberRegistry>,
}

impl SampleStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            records: RwLock::new(HashMap::new()),
            subscribers: Arc::new(SubscriberRegistry::new(config.subscriber_queue)),
        }
    }

    /// Declare an interface so status reports it before its first sample
    pub fn register_interface(&self, name: impl Into<String>) {
        let history_size = self.config.history_size;
        self.records
            .write()
            .entry(name.into())
            .or_insert_with(|| InterfaceRecord::new(history_size));
    }

    /// Accept a sample: ring-buffer insert, then fan-out to subscribers
    pub fn update(&self, sample: Sample) {
        let sample = Arc::new(sample);

        {
            let mut records = self.records.write();
            let record = records
                .entry(sample.interface_name.clone())
                .or_insert_with(|| InterfaceRecord::new(self.config.history_size));
            record.push(Arc::clone(&sample));
        }

        let delivered = self.subscribers.publish(&sample);
        trace!(
            interface = %sample.interface_name,
            signal = sample.signal_quality,
            connected = sample.connected,
            delivered,
            "sample accepted"
        );
    }

    /// Latest sample of every known interface
    pub fn status(&self) -> StatusSnapshot {
        self.records
            .read()
            .iter()
            .map(|(name, record)| {
                let status = match record.latest() {
                    Some(sample) => InterfaceStatus::Latest(Arc::clone(sample)),
                    None => InterfaceStatus::NoData,
                };
                (name.clone(), status)
            })
            .collect()
    }

    /// Best connected interface right now, if any
    pub fn best(&self) -> Option<Arc<Sample>> {
        select_best(&self.status())
    }

    /// Buffered samples for one interface, oldest first
    pub fn history(&self, name: &str) -> Option<Vec<Arc<Sample>>> {
        self.records.read().get(name).map(InterfaceRecord::history)
    }

    /// Attach a live consumer; it sees samples accepted from now on
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn slow_disconnects(&self) -> u64 {
        self.subscribers.slow_disconnects()
    }

    /// Shut the store down: every subscriber stream ends
    pub fn close(&self) {
        self.subscribers.close_all();
    }
}

impl Drop for SampleStore {
    fn drop(&mut self) {
        self.close();
    }
}
