use std::collections::VecDeque;
use std::sync::Arc;

use super::Sample;

/// Bounded history plus latest-value cache for one interface.
///
/// Samples are kept oldest to newest. Once `capacity` is reached every push
/// evicts the oldest entry, so the buffer never grows past its bound.
#[derive(Debug, Clone)]
pub struct InterfaceRecord {
    samples: VecDeque<Arc<Sample>>,
    capacity: usize,
}

impl InterfaceRecord {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a sample, returning the evicted one if the buffer was full
    pub fn push(&mut self, sample: Arc<Sample>) -> Option<Arc<Sample>> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };

        self.samples.push_back(sample);
        evicted
    }

    /// Newest sample; always the back of the buffer
    pub fn latest(&self) -> Option<&Arc<Sample>> {
        self.samples.back()
    }

    pub fn history(&self) -> Vec<Arc<Sample>> {
        self.samples.iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
