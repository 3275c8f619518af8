use std::cmp::Ordering;
use std::sync::Arc;

use super::{Sample, StatusSnapshot};

/// Pick the best connected interface from a snapshot.
///
/// Highest `signal_quality` wins; ties go to the lexicographically smallest
/// interface name. Returns `None` when nothing is connected.
pub fn select_best(snapshot: &StatusSnapshot) -> Option<Arc<Sample>> {
    snapshot
        .iter()
        .filter_map(|(name, status)| status.sample().map(|sample| (name, sample)))
        .filter(|(_, sample)| sample.is_eligible())
        .min_by(|(a_name, a), (b_name, b)| {
            b.signal_quality
                .partial_cmp(&a.signal_quality)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_name.cmp(b_name))
        })
        .map(|(_, sample)| Arc::clone(sample))
}
