use thiserror::Error;

use crate::ports::CollectError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

impl From<ParseError> for CollectError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(e) => CollectError::Io(e),
            other => CollectError::Parse(other.to_string()),
        }
    }
}

/// One interface line of /proc/net/wireless
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessEntry {
    pub interface: String,
    pub status: u16,
    pub link: f64,
    /// Signal level in dBm
    pub level: f64,
    pub noise: f64,
}

/// Parse /proc/net/wireless
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
///  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
///  wlan0: 0000   70.  -40.  -256        0      0      0      0      0        0
/// ```
pub fn parse_wireless(content: &str) -> ParseResult<Vec<WirelessEntry>> {
    let mut entries = Vec::new();

    // First two lines are column headers
    for line in content.lines().skip(2) {
        if line.trim().is_empty() {
            continue;
        }

        let (name, rest) = line
            .split_once(':')
            .ok_or_else(|| ParseError::Parse(format!("No interface separator in: {}", line.trim())))?;
        let interface = name.trim().to_string();

        let parts: Vec<&str> = rest.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ParseError::MissingField(format!("quality columns for {}", interface)));
        }

        let status = u16::from_str_radix(parts[0], 16)
            .map_err(|e| ParseError::Parse(format!("Invalid status for {}: {}", interface, e)))?;
        let link = parse_quality_value(parts[1], "link", &interface)?;
        let level = parse_quality_value(parts[2], "level", &interface)?;
        let noise = parse_quality_value(parts[3], "noise", &interface)?;

        entries.push(WirelessEntry {
            interface,
            status,
            link,
            level,
            noise,
        });
    }

    Ok(entries)
}

/// Quality columns carry a trailing '.' when the driver updated the value
fn parse_quality_value(raw: &str, field: &str, interface: &str) -> ParseResult<f64> {
    raw.trim_end_matches('.')
        .parse::<f64>()
        .map_err(|e| ParseError::Parse(format!("Invalid {} for {}: {}", field, interface, e)))
}

/// Parse /sys/class/net/{iface}/operstate
pub fn parse_operstate(content: &str) -> OperState {
    match content.trim() {
        "up" => OperState::Up,
        "down" => OperState::Down,
        "dormant" => OperState::Dormant,
        _ => OperState::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperState {
    Up,
    Down,
    Dormant,
    Unknown,
}
