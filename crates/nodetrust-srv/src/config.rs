//! Server configuration for nodetrust nodes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a nodetrust server node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// DNS zone peer names are issued under (e.g. `example.com`).
    pub zone: String,

    /// Trust cache bounds.
    #[serde(default)]
    pub cache: CacheConfig,

    /// DNS provider settings.
    pub dns: DnsConfig,
}

/// Bounds for the trust cache and its dependent views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of trusted peers held at once.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Maximum age of a trust entry in seconds before expiry.
    #[serde(default = "default_entry_ttl_secs")]
    pub entry_ttl_secs: u64,
}

/// DNS provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Base URL of the provider's REST API.
    pub provider_url: String,

    /// Delay between readiness re-checks while the startup sweep is
    /// still pending (milliseconds).
    #[serde(default = "default_sync_retry_ms")]
    pub sync_retry_ms: u64,
}

impl CacheConfig {
    /// Entry TTL as a [`Duration`].
    #[must_use]
    pub const fn entry_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_ttl_secs)
    }
}

impl DnsConfig {
    /// Readiness retry delay as a [`Duration`].
    #[must_use]
    pub const fn sync_retry(&self) -> Duration {
        Duration::from_millis(self.sync_retry_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            entry_ttl_secs: default_entry_ttl_secs(),
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::NodetrustError::Config(e.to_string()))
    }

    /// Validate field combinations that serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.zone.is_empty() {
            return Err(crate::NodetrustError::Config("zone must not be empty".into()));
        }
        if self.cache.max_entries == 0 {
            return Err(crate::NodetrustError::Config(
                "cache.max_entries must be positive".into(),
            ));
        }
        Ok(())
    }
}

// Default value functions for serde.
const fn default_max_entries() -> usize {
    1_000_000
}

const fn default_entry_ttl_secs() -> u64 {
    300
}

const fn default_sync_retry_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 1_000_000);
        assert_eq!(config.entry_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            zone = "example.com"

            [dns]
            provider_url = "http://127.0.0.1:8053"
            "#,
        )
        .unwrap();
        assert_eq!(config.zone, "example.com");
        assert_eq!(config.dns.sync_retry(), Duration::from_millis(500));
        assert_eq!(config.cache.max_entries, 1_000_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_zone() {
        let config: ServerConfig = toml::from_str(
            r#"
            zone = ""

            [dns]
            provider_url = "http://127.0.0.1:8053"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
