use chrono::{DateTime, Utc};

/// Port for the time source used to stamp samples
pub trait Clock: Send + Sync {
    /// Current time; never goes backwards between calls
    fn now(&self) -> DateTime<Utc>;
}
