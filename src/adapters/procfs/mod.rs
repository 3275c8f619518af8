mod parser;
mod wireless;

use std::path::PathBuf;

pub use parser::{ParseError, ParseResult};
pub use wireless::ProcfsWirelessCollector;

/// Configuration for procfs/sysfs paths (useful for Docker mounts)
#[derive(Debug, Clone)]
pub struct ProcfsConfig {
    pub proc_path: PathBuf,
    pub sys_path: PathBuf,
}

impl ProcfsConfig {
    pub fn new(proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
        }
    }

    pub fn host() -> Self {
        Self {
            proc_path: PathBuf::from("/proc"),
            sys_path: PathBuf::from("/sys"),
        }
    }

    /// Collector for one interface under these paths
    pub fn collector(&self, interface: impl Into<String>) -> ProcfsWirelessCollector {
        ProcfsWirelessCollector::new(interface, self.clone())
    }
}

impl Default for ProcfsConfig {
    fn default() -> Self {
        Self::host()
    }
}
