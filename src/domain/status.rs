use std::collections::BTreeMap;
use std::sync::Arc;

use super::Sample;

/// Latest known state of one interface
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceStatus {
    /// Registered but never successfully sampled
    NoData,
    Latest(Arc<Sample>),
}

impl InterfaceStatus {
    pub fn sample(&self) -> Option<&Arc<Sample>> {
        match self {
            InterfaceStatus::NoData => None,
            InterfaceStatus::Latest(sample) => Some(sample),
        }
    }
}

/// Point-in-time copy of every known interface's latest sample.
///
/// Owns its entries; later store updates never show through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    entries: BTreeMap<String, InterfaceStatus>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, status: InterfaceStatus) {
        self.entries.insert(name.into(), status);
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceStatus> {
        self.entries.get(name)
    }

    /// Entries in interface-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterfaceStatus)> {
        self.entries.iter().map(|(name, status)| (name.as_str(), status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, InterfaceStatus)> for StatusSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, InterfaceStatus)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
