use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::adapters::{ProcfsConfig, StoreConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no interfaces provided; use --if <ifname>")]
    NoInterfaces,

    #[error("interface name cannot be empty")]
    EmptyInterfaceName,

    #[error("sampling interval must be greater than zero")]
    ZeroInterval,

    #[error("collect timeout must be greater than zero")]
    ZeroCollectTimeout,

    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),

    #[error("invalid listen address: {0}")]
    InvalidListen(String),
}

/// Application configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "wifi-radar", version, about = "Wireless link quality monitor")]
pub struct Config {
    /// Interface name to monitor (repeatable, or comma-separated in the env var)
    #[arg(long = "if", value_name = "IFNAME", env = "WIFI_RADAR_IF", value_delimiter = ',', required = true)]
    pub interfaces: Vec<String>,

    /// Sampling interval, e.g. 500ms or 2s
    #[arg(long, env = "WIFI_RADAR_INTERVAL", default_value = "500ms", value_parser = parse_duration)]
    pub interval: Duration,

    /// HTTP bind address
    #[arg(long, env = "WIFI_RADAR_LISTEN", default_value = "127.0.0.1:8888")]
    pub listen: String,

    /// Bind all addresses instead of loopback (keeps the --listen port)
    #[arg(long, env = "WIFI_RADAR_PUBLIC")]
    pub public: bool,

    /// Samples kept per interface
    #[arg(long, env = "WIFI_RADAR_HISTORY_SIZE", default_value_t = 8)]
    pub history_size: usize,

    /// Samples a stream client may lag behind before it is disconnected
    #[arg(long, env = "WIFI_RADAR_SUBSCRIBER_QUEUE", default_value_t = 64)]
    pub subscriber_queue: usize,

    /// Per-interface collection time limit; defaults to the interval
    #[arg(long, env = "WIFI_RADAR_COLLECT_TIMEOUT", value_parser = parse_duration)]
    pub collect_timeout: Option<Duration>,

    /// Directory of dashboard files served at /
    #[arg(long, env = "WIFI_RADAR_STATIC_DIR", default_value = "web/static")]
    pub static_dir: PathBuf,

    /// Procfs root holding net/wireless
    #[arg(long, env = "WIFI_RADAR_PROC_PATH", default_value = "/proc")]
    pub proc_path: PathBuf,

    /// Sysfs root holding class/net/<iface>
    #[arg(long, env = "WIFI_RADAR_SYS_PATH", default_value = "/sys")]
    pub sys_path: PathBuf,

    /// Log level for wifi-radar; RUST_LOG overrides it
    #[arg(long, env = "WIFI_RADAR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interfaces.is_empty() {
            return Err(ConfigError::NoInterfaces);
        }
        if self.interfaces.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyInterfaceName);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.collect_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::ZeroCollectTimeout);
        }
        if self.history_size == 0 {
            return Err(ConfigError::ZeroCapacity("history size"));
        }
        if self.subscriber_queue == 0 {
            return Err(ConfigError::ZeroCapacity("subscriber queue"));
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Effective socket address, honouring --public
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr: SocketAddr = self
            .listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(self.listen.clone()))?;

        if self.public {
            Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), addr.port()))
        } else {
            Ok(addr)
        }
    }

    pub fn collect_timeout(&self) -> Duration {
        self.collect_timeout.unwrap_or(self.interval)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            history_size: self.history_size,
            subscriber_queue: self.subscriber_queue,
        }
    }

    pub fn procfs_config(&self) -> ProcfsConfig {
        ProcfsConfig::new(self.proc_path.clone(), self.sys_path.clone())
    }
}

/// Accepts `<n>ms`, `<n>s`, or a bare number of milliseconds
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, scale) = if let Some(ms) = raw.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(s) = raw.strip_suffix('s') {
        (s, 1_000)
    } else {
        (raw, 1)
    };

    digits
        .trim()
        .parse::<u64>()
        .map(|n| Duration::from_millis(n.saturating_mul(scale)))
        .map_err(|e| format!("invalid duration {:?}: {}", raw, e))
}
