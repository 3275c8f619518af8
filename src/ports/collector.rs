use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Sample;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Interface exists but is not associated with an access point
    #[error("interface {0} is not associated")]
    NotAssociated(String),

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("collection timed out after {0:?}")]
    TimedOut(Duration),
}

impl CollectError {
    /// Expected during normal operation; not worth an alarm
    pub fn is_not_associated(&self) -> bool {
        matches!(self, CollectError::NotAssociated(_))
    }
}

/// Port for reading link quality of a single interface
#[async_trait]
pub trait LinkCollector: Send + Sync {
    /// Name of the interface this collector samples
    fn interface(&self) -> &str;

    /// Take one reading stamped with `observed_at`
    async fn collect(&self, observed_at: DateTime<Utc>) -> Result<Sample, CollectError>;
}
