use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::domain::Sample;
use crate::ports::{CollectError, LinkCollector};

use super::parser::{self, OperState};
use super::ProcfsConfig;

/// Link collector reading /proc/net/wireless and sysfs operstate
#[derive(Debug, Clone)]
pub struct ProcfsWirelessCollector {
    interface: String,
    config: ProcfsConfig,
}

impl ProcfsWirelessCollector {
    pub fn new(interface: impl Into<String>, config: ProcfsConfig) -> Self {
        Self {
            interface: interface.into(),
            config,
        }
    }

    async fn interface_exists(&self) -> bool {
        let path = self.config.sys_path.join("class/net").join(&self.interface);
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn operstate(&self) -> OperState {
        let path = self
            .config
            .sys_path
            .join("class/net")
            .join(&self.interface)
            .join("operstate");

        match fs::read_to_string(&path).await {
            Ok(content) => parser::parse_operstate(&content),
            Err(_) => OperState::Unknown,
        }
    }
}

#[async_trait]
impl LinkCollector for ProcfsWirelessCollector {
    fn interface(&self) -> &str {
        &self.interface
    }

    async fn collect(&self, observed_at: DateTime<Utc>) -> Result<Sample, CollectError> {
        let wireless_path = self.config.proc_path.join("net/wireless");
        let content = fs::read_to_string(&wireless_path).await?;
        let entries = parser::parse_wireless(&content)?;

        // Drivers drop the interface from this table while disassociated
        let Some(entry) = entries.into_iter().find(|e| e.interface == self.interface) else {
            return if self.interface_exists().await {
                Err(CollectError::NotAssociated(self.interface.clone()))
            } else {
                Err(CollectError::InterfaceNotFound(self.interface.clone()))
            };
        };

        let connected = match self.operstate().await {
            OperState::Up => true,
            OperState::Unknown => entry.link > 0.0,
            OperState::Down | OperState::Dormant => false,
        };

        Ok(Sample::new(
            self.interface.clone(),
            observed_at,
            entry.level,
            connected,
        ))
    }
}
