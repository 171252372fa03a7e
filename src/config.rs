//! Server configuration
//!
//! Read once from the environment at startup:
//!
//! ```bash
//! QUICKPOLL_BIND=0.0.0.0:8000
//! QUICKPOLL_IDLE_TIMEOUT_SECS=30
//! QUICKPOLL_SEND_TIMEOUT_MS=1000
//! QUICKPOLL_MAX_CONNECTIONS=10000
//! ```

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Timing and capacity settings for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// How long a connection may stay silent before it is probed
    pub idle_timeout: Duration,
    /// Upper bound on a single frame send
    pub send_timeout: Duration,
    /// Maximum number of live connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(1),
            max_connections: 10_000,
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `QUICKPOLL_*` environment variables.
    ///
    /// Unset variables fall back to defaults; malformed ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "QUICKPOLL_BIND")? {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "QUICKPOLL_IDLE_TIMEOUT_SECS")? {
            config.hub.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "QUICKPOLL_SEND_TIMEOUT_MS")? {
            config.hub.send_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var(&lookup, "QUICKPOLL_MAX_CONNECTIONS")? {
            config.hub.max_connections = max;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.hub.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.hub.send_timeout, Duration::from_secs(1));
        assert_eq!(config.hub.max_connections, 10_000);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("QUICKPOLL_BIND", "127.0.0.1:9000"),
            ("QUICKPOLL_IDLE_TIMEOUT_SECS", "5"),
            ("QUICKPOLL_SEND_TIMEOUT_MS", "250"),
            ("QUICKPOLL_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.hub.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.hub.send_timeout, Duration::from_millis(250));
        assert_eq!(config.hub.max_connections, 3);
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("QUICKPOLL_SEND_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("QUICKPOLL_SEND_TIMEOUT_MS"));
    }
}
