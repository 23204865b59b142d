use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadline applied to every request when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Port the hub serves its API on when the address does not name one
pub const DEFAULT_PORT: u16 = 80;

/// Connection settings for a single hub
///
/// The address is an IPv4 address or host name, optionally followed by
/// `:port`. IPv6 literals are accepted bare (`fe80::1`) or bracketed, and take
/// a port only in the bracketed form (`[fe80::1]:8080`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    pub address: String,

    #[serde(default = "default_timeout", with = "millis")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl HubConfig {
    /// Settings for the hub at `address` with the default timeout
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` form suitable for opening a TCP connection
    pub fn socket_address(&self) -> String {
        if has_port(&self.address) {
            self.address.clone()
        } else if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, DEFAULT_PORT)
        } else {
            format!("{}:{}", self.address, DEFAULT_PORT)
        }
    }
}

fn has_port(address: &str) -> bool {
    if let Some(bracketed) = address.strip_prefix('[') {
        return match bracketed.split_once("]:") {
            Some((_, port)) => port.parse::<u16>().is_ok(),
            None => false,
        };
    }
    match address.rsplit_once(':') {
        // A second colon means a bare IPv6 literal, which cannot carry a port.
        Some((host, port)) => {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
