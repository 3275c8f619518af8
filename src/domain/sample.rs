use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped link-quality reading for one interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub interface_name: String,
    pub timestamp: DateTime<Utc>,
    /// Signal level, usually dBm
    pub signal_quality: f64,
    pub connected: bool,
}

impl Sample {
    pub fn new(
        interface_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        signal_quality: f64,
        connected: bool,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            timestamp,
            signal_quality,
            connected,
        }
    }

    /// Whether this reading makes its interface a best-selection candidate
    pub fn is_eligible(&self) -> bool {
        self.connected && !self.signal_quality.is_nan()
    }
}
