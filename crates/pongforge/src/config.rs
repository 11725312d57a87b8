//! Server configuration.
//!
//! Everything has a working default; the environment can only override the
//! listening port.

use std::env;

use pongforge_lobby::LobbyConfig;
use pongforge_physics::Field;
use pongforge_tick::TickConfig;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 4000;

/// Default capacity of the hub's command channel.
const DEFAULT_HUB_CHANNEL_SIZE: usize = 64;

/// Default capacity of each connection's outbound queue: about four seconds
/// of frames at the default tick.
const DEFAULT_OUTBOUND_CHANNEL_SIZE: usize = 256;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Tick period and overrun handling.
    pub tick: TickConfig,
    /// Play field geometry and ball launch parameters.
    pub field: Field,
    /// Player limits for games.
    pub lobby: LobbyConfig,
    /// Capacity of the hub's command channel. Connection handlers wait when
    /// it is full.
    pub hub_channel_size: usize,
    /// Capacity of each connection's outbound queue. Frames for a peer whose
    /// queue is full are dropped.
    pub outbound_channel_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            tick: TickConfig::default(),
            field: Field::default(),
            lobby: LobbyConfig::default(),
            hub_channel_size: DEFAULT_HUB_CHANNEL_SIZE,
            outbound_channel_size: DEFAULT_OUTBOUND_CHANNEL_SIZE,
        }
    }
}

impl ServerConfig {
    /// Defaults, with the port taken from `PORT` if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("PORT") {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:4000");
        assert_eq!(config.tick.period, Duration::from_millis(16));
        assert_eq!(config.lobby.min_players, 2);
        assert_eq!(config.field.width, 800.0);
        assert_eq!(config.outbound_channel_size, 256);
    }

    #[test]
    fn test_from_lookup_without_port_uses_default() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:4000");
    }

    #[test]
    fn test_from_lookup_reads_port() {
        let config =
            ServerConfig::from_lookup(|key| (key == "PORT").then(|| "9100".to_string())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9100");
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        let result = ServerConfig::from_lookup(|_| Some("eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidPort(v)) if v == "eighty"));

        let result = ServerConfig::from_lookup(|_| Some("70000".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }
}
