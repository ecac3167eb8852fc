use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`Connection`](crate::Connection)
///
/// The defaults follow the YNCA protocol timings: at least 100 ms between
/// commands and a keep-alive well within the 40 second standby disconnect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Minimum gap between two outgoing lines
    #[serde(default = "default_command_spacing_ms")]
    pub command_spacing_ms: u64,

    /// Outgoing silence after which a keep-alive request is sent
    #[serde(default = "default_keep_alive_interval_ms")]
    pub keep_alive_interval_ms: u64,

    /// Upper bound on waiting for the sender loop when closing
    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,

    /// Upper bound on opening a `socket://` target
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Baud rate for serial targets
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long a subunit waits for each initialization burst
    #[serde(default = "default_initialization_timeout_ms")]
    pub initialization_timeout_ms: u64,
}

fn default_command_spacing_ms() -> u64 {
    100
}

fn default_keep_alive_interval_ms() -> u64 {
    30_000
}

fn default_close_timeout_ms() -> u64 {
    2_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_initialization_timeout_ms() -> u64 {
    3_000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            command_spacing_ms: default_command_spacing_ms(),
            keep_alive_interval_ms: default_keep_alive_interval_ms(),
            close_timeout_ms: default_close_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            baud_rate: default_baud_rate(),
            initialization_timeout_ms: default_initialization_timeout_ms(),
        }
    }
}

impl ConnectionConfig {
    pub fn command_spacing(&self) -> Duration {
        Duration::from_millis(self.command_spacing_ms)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_millis(self.keep_alive_interval_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn initialization_timeout(&self) -> Duration {
        Duration::from_millis(self.initialization_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_timing() {
        let config = ConnectionConfig::default();
        assert_eq!(config.command_spacing(), Duration::from_millis(100));
        assert_eq!(config.keep_alive_interval(), Duration::from_secs(30));
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{ "command_spacing_ms": 5, "baud_rate": 115200 }"#).unwrap();
        assert_eq!(config.command_spacing_ms, 5);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.keep_alive_interval_ms, 30_000);
        assert_eq!(config.initialization_timeout_ms, 3_000);
    }
}
